//! Closed category vocabulary shared by the extraction prompt and any
//! downstream selection UI.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Language of the category labels and the extraction instructions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Locale {
    #[serde(rename = "zh")]
    #[default]
    Zh,
    #[serde(rename = "en")]
    En,
}

impl Locale {
    pub fn code(&self) -> &'static str {
        match self {
            Locale::Zh => "zh",
            Locale::En => "en",
        }
    }

    /// The full, ordered label list for this locale, sentinels included.
    pub fn category_labels(&self) -> Vec<&'static str> {
        Category::ALL.iter().map(|c| c.label(*self)).collect()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zh" | "zh-cn" | "cn" => Ok(Locale::Zh),
            "en" | "en-us" | "en-gb" => Ok(Locale::En),
            other => Err(ConfigError::UnknownLocale(other.to_string())),
        }
    }
}

/// Transaction categories. The set is closed: anything the model emits
/// outside of it becomes [`Category::NeedsReview`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    #[serde(rename = "housing")]
    Housing,
    #[serde(rename = "food-dining")]
    FoodDining,
    #[serde(rename = "transportation")]
    Transportation,
    #[serde(rename = "utilities")]
    Utilities,
    #[serde(rename = "shopping")]
    Shopping,
    #[serde(rename = "entertainment")]
    Entertainment,
    #[serde(rename = "health-fitness")]
    HealthFitness,
    #[serde(rename = "travel")]
    Travel,
    #[serde(rename = "education")]
    Education,
    #[serde(rename = "debt")]
    Debt,
    #[serde(rename = "savings-investments")]
    SavingsInvestments,
    /// Low confidence: the extractor could not classify the item.
    #[serde(rename = "needs-review")]
    NeedsReview,
    /// Confidently outside every other category.
    #[serde(rename = "other")]
    Other,
}

impl Category {
    /// Prompt and UI order.
    pub const ALL: [Category; 13] = [
        Category::Housing,
        Category::FoodDining,
        Category::Transportation,
        Category::Utilities,
        Category::Shopping,
        Category::Entertainment,
        Category::HealthFitness,
        Category::Travel,
        Category::Education,
        Category::Debt,
        Category::SavingsInvestments,
        Category::NeedsReview,
        Category::Other,
    ];

    pub fn label(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::Zh => self.label_zh(),
            Locale::En => self.label_en(),
        }
    }

    fn label_zh(&self) -> &'static str {
        match self {
            Category::Housing => "住房",
            Category::FoodDining => "餐饮",
            Category::Transportation => "交通",
            Category::Utilities => "公用事业",
            Category::Shopping => "购物",
            Category::Entertainment => "娱乐",
            Category::HealthFitness => "健康与健身",
            Category::Travel => "旅行",
            Category::Education => "教育",
            Category::Debt => "债务",
            Category::SavingsInvestments => "储蓄/投资",
            Category::NeedsReview => "需要复核",
            Category::Other => "其他",
        }
    }

    fn label_en(&self) -> &'static str {
        match self {
            Category::Housing => "Housing",
            Category::FoodDining => "Food & Dining",
            Category::Transportation => "Transportation",
            Category::Utilities => "Utilities",
            Category::Shopping => "Shopping",
            Category::Entertainment => "Entertainment",
            Category::HealthFitness => "Health & Fitness",
            Category::Travel => "Travel",
            Category::Education => "Education",
            Category::Debt => "Debt",
            Category::SavingsInvestments => "Savings/Investments",
            Category::NeedsReview => "Needs Review",
            Category::Other => "Other",
        }
    }

    /// Map a model-emitted label back onto the closed set.
    ///
    /// Labels from either locale are accepted (trimmed, ASCII
    /// case-insensitive). Unknown labels coerce to `NeedsReview`; they are
    /// never dropped and never folded into `Other`.
    pub fn from_label(label: &str) -> Category {
        let wanted = label.trim();
        Category::ALL
            .iter()
            .copied()
            .find(|c| {
                c.label_zh() == wanted || c.label_en().eq_ignore_ascii_case(wanted)
            })
            .unwrap_or(Category::NeedsReview)
    }
}
