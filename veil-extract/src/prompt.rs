//! Extraction instructions sent with every chunk.
//!
//! The response contract (key names, sign convention, sentinel categories)
//! must stay in step with `parse.rs`.

use veil_core::{Category, Locale};

pub const KEY_DATE: &str = "Date";
pub const KEY_DESCRIPTION: &str = "Description";
pub const KEY_AMOUNT: &str = "Amount";
pub const KEY_CATEGORY: &str = "Category";
pub const KEY_CARD_LAST_FOUR: &str = "CardLastFour";

/// System instructions for `locale`, with year-less dates pinned to
/// `reference_year`.
pub fn system_prompt(locale: Locale, reference_year: i32) -> String {
    let categories = locale.category_labels().join(", ");
    let needs_review = Category::NeedsReview.label(locale);
    let other = Category::Other.label(locale);
    let example_category = Category::Shopping.label(locale);

    match locale {
        Locale::Zh => format!(
            "你是一位专业的财务助手。你的任务是从提供的文本中提取信用卡交易详情，\
并将每笔交易分类到以下类别之一：{categories}。\n\n\
严格以JSON对象列表的形式返回输出。每个对象必须包含以下键：\n\
- \"{KEY_DATE}\": 交易日期 (格式 YYYY-MM-DD)。如果年份缺失，假设为 {reference_year}。\n\
- \"{KEY_DESCRIPTION}\": 商户名称或交易描述。\n\
- \"{KEY_AMOUNT}\": 交易的数值 (正数表示支出，负数表示退款)。忽略信用卡还款及账单结清记录。\n\
- \"{KEY_CATEGORY}\": 从提供的类别中选择一个。\n  - 如果描述模糊不清或你不确定类别，请务必使用 \"{needs_review}\"。\n  - 只有当你确定它不属于上述任何主要类别时，才使用 \"{other}\"。\n\
- \"{KEY_CARD_LAST_FOUR}\": 交易卡号后四位。如果未找到，返回 null。\n\n\
只返回JSON数据，不要有任何Markdown格式或解释。\n\
例如：[{{\"{KEY_DATE}\": \"{reference_year}-01-01\", \"{KEY_DESCRIPTION}\": \"超市\", \
\"{KEY_AMOUNT}\": 50.00, \"{KEY_CATEGORY}\": \"{example_category}\", \"{KEY_CARD_LAST_FOUR}\": \"1234\"}}]\n\
如果未找到交易，返回 []。"
        ),
        Locale::En => format!(
            "You are a professional financial assistant. Extract the credit card \
transactions from the provided text and classify each one into exactly one of these \
categories: {categories}.\n\n\
Return strictly a JSON array of objects. Every object must have these keys:\n\
- \"{KEY_DATE}\": transaction date as YYYY-MM-DD. If the year is missing, assume {reference_year}.\n\
- \"{KEY_DESCRIPTION}\": merchant name or transaction description.\n\
- \"{KEY_AMOUNT}\": numeric amount, positive for expenses and negative for refunds. \
Skip payments to the card and statement settlement lines.\n\
- \"{KEY_CATEGORY}\": one of the categories above.\n  - If the description is ambiguous or you are not sure, you must use \"{needs_review}\".\n  - Use \"{other}\" only when you are confident it fits none of the main categories.\n\
- \"{KEY_CARD_LAST_FOUR}\": last four digits of the card used, or null if not shown.\n\n\
Return only the JSON, with no Markdown and no explanation.\n\
Example: [{{\"{KEY_DATE}\": \"{reference_year}-01-01\", \"{KEY_DESCRIPTION}\": \"Supermarket\", \
\"{KEY_AMOUNT}\": 50.00, \"{KEY_CATEGORY}\": \"{example_category}\", \"{KEY_CARD_LAST_FOUR}\": \"1234\"}}]\n\
If there are no transactions, return []."
        ),
    }
}

/// User turn carrying the chunk itself.
pub fn user_message(chunk: &str) -> String {
    format!("Here is the statement text:\n\n{chunk}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_lists_every_category() {
        for locale in [Locale::Zh, Locale::En] {
            let p = system_prompt(locale, 2026);
            for label in locale.category_labels() {
                assert!(p.contains(label), "{locale}: missing {label}");
            }
        }
    }

    #[test]
    fn test_prompt_states_contract() {
        let p = system_prompt(Locale::En, 2026);
        for key in [KEY_DATE, KEY_DESCRIPTION, KEY_AMOUNT, KEY_CATEGORY, KEY_CARD_LAST_FOUR] {
            assert!(p.contains(&format!("\"{key}\"")));
        }
        assert!(p.contains("assume 2026"));
        assert!(p.contains("\"Needs Review\""));
        assert!(p.contains("negative for refunds"));
        assert!(p.contains("Skip payments to the card"));
    }

    #[test]
    fn test_zh_prompt_uses_zh_sentinels() {
        let p = system_prompt(Locale::Zh, 2025);
        assert!(p.contains("\"需要复核\""));
        assert!(p.contains("\"其他\""));
        assert!(p.contains("假设为 2025"));
    }

    #[test]
    fn test_user_message_wraps_chunk() {
        assert!(user_message("10/01 UBER 25.50").ends_with("10/01 UBER 25.50"));
    }
}
