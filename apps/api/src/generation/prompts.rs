// All LLM prompt constants for the Generation module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for domestic (Taiwan) group tours.
pub const DOMESTIC_SYSTEM: &str = "你是一位資深的台灣國內旅遊產品企劃，\
    專長是規劃團體旅遊行程並撰寫吸引人的行銷文案。\
    你熟悉台灣各地的景點、交通、在地美食與住宿，\
    安排的行程必須順路、節奏合理，並符合遊覽車團體的實際作業。";

/// System prompt for international group tours.
pub const INTERNATIONAL_SYSTEM: &str = "你是一位資深的國外團體旅遊產品企劃，\
    專長是規劃從台灣出發的海外團體行程並撰寫精緻的行銷文案。\
    你熟悉各國的航班、城市動線、代表性景點、特色餐食與飯店，\
    必須提供去回程航班資訊與旅遊國家城市，並附上實用的行前注意事項。";

/// System prompt for quotation estimation.
pub const QUOTATION_SYSTEM: &str = "你是一位旅行社的團體報價專員，\
    熟悉交通、住宿、餐飲、門票與領隊導遊費用的市場行情，\
    能依行程內容估算每人成本並提出合理售價。";

/// Plan prompt. Replace `{product_name}`, `{kind_label}`, `{extra}` and `{schema}`.
pub const PLAN_PROMPT_TEMPLATE: &str = r#"請根據以下資訊產出行程：
商品名稱: {product_name}
類型: {kind_label}
{extra}

請確保內容專業且吸引人。在 days 陣列中，請為每個景點預設分配 1 張圖片 (imageCount: 1)，並指定 imagePosition (left / right / bottom)。
細部行程 (timeline) 請僅包含活動內容 (activity)，不要加入時間資訊 (如 09:00)。
描述部分 (description) 請寫得具備視覺感，以便後續生成對應景點的圖片。
imageUrl 請填入一組適合搜尋該日景點照片的英文關鍵字。

請回傳符合以下結構的 JSON 物件：
{schema}"#;

/// JSON shape of a generated plan, embedded into the plan prompt.
pub const PLAN_SCHEMA: &str = r#"{
  "mainTitle": "string",
  "marketingSubtitle": "string",
  "departureInfo": "string",
  "countryCity": "string (國外團必填)",
  "flightInfo": {"departure": "string", "return": "string"},
  "highlights": ["string"],
  "days": [
    {
      "day": 1,
      "title": "string",
      "description": "string",
      "timeline": [{"activity": "string"}],
      "meals": {"breakfast": "string", "lunch": "string", "dinner": "string"},
      "accommodation": "string",
      "imageUrl": "string",
      "imagePosition": "left | right | bottom",
      "imageCount": 1
    }
  ],
  "costIncludes": ["string"],
  "costExcludes": ["string"],
  "precautions": ["string"],
  "suggestedItems": ["string"]
}"#;

/// Quotation prompt. Replace `{title}`, `{day_count}`, `{highlights}`, `{cost_reference}`
/// and `{schema}`.
pub const QUOTATION_PROMPT_TEMPLATE: &str = r#"請根據以下旅遊行程內容，自動估算各項成本並生成一份詳細的報價單表格。

行程內容：
標題：{title}
天數：{day_count} 天
行程亮點：{highlights}

{cost_reference}

請包含以下類別：交通、住宿、餐飲、門票、導遊司機服務費、雜費等。
請確保計算邏輯正確：totalCost 應為所有 items 的 unitPrice * quantity 之和。
suggestedSellingPrice 請根據 totalCost 加上合理的利潤（約 10-20%）。
profitMargin 為 (suggestedSellingPrice - totalCost) / suggestedSellingPrice。

請回傳符合以下結構的 JSON 物件：
{schema}"#;

/// Used in place of operator cost data when none is supplied.
pub const MARKET_RATE_INSTRUCTION: &str = "請根據市場行情進行合理估算。";

pub const QUOTATION_SCHEMA: &str = r#"{
  "items": [
    {"category": "string", "item": "string", "unitPrice": 0, "quantity": 0, "note": "string"}
  ],
  "totalCost": 0,
  "suggestedSellingPrice": 0,
  "profitMargin": 0
}"#;
