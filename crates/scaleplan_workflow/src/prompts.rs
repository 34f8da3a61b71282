//! Instruction templates and placeholder substitution.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Placeholder replaced with the featured brand.
pub const BRAND_PLACEHOLDER: &str = "{Featured Brand}";
/// Placeholder replaced with the product category.
pub const CATEGORY_PLACEHOLDER: &str = "{Category Name}";
/// Placeholder replaced with the comparison brand.
pub const COMPETITOR_PLACEHOLDER: &str = "{Comparison Brand}";

/// Every placeholder [`fill_prompt`] recognizes.
pub const PLACEHOLDERS: [&str; 3] = [
    BRAND_PLACEHOLDER,
    CATEGORY_PLACEHOLDER,
    COMPETITOR_PLACEHOLDER,
];

/// System instruction sent ahead of every plan and refinement call.
pub const PLAN_SYSTEM_INSTRUCTION: &str = "You are a senior e-commerce strategist and Built to Scale™ expert. \
When asked to refine a plan, only use the provided data and prior assistant/user turns. \
If data is missing, include Data-Lock notices and avoid inventing numeric baselines.";

const EXTRACTION_TEMPLATE: &str = include_str!("../prompts/extraction.md");
const PLAN_TEMPLATE: &str = include_str!("../prompts/plan.md");
const EVALUATION_TEMPLATE: &str = include_str!("../prompts/evaluation.md");
const STORYBOARD_TEMPLATE: &str = include_str!("../prompts/storyboard.md");

/// The four stage instructions.
///
/// [`Default`] yields the built-in templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct PromptTemplates {
    extraction: String,
    plan: String,
    evaluation: String,
    storyboard: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            extraction: EXTRACTION_TEMPLATE.to_string(),
            plan: PLAN_TEMPLATE.to_string(),
            evaluation: EVALUATION_TEMPLATE.to_string(),
            storyboard: STORYBOARD_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplates {
    /// Creates a template set from custom instructions.
    pub fn new(
        extraction: impl Into<String>,
        plan: impl Into<String>,
        evaluation: impl Into<String>,
        storyboard: impl Into<String>,
    ) -> Self {
        Self {
            extraction: extraction.into(),
            plan: plan.into(),
            evaluation: evaluation.into(),
            storyboard: storyboard.into(),
        }
    }
}

/// Values substituted into templates.
///
/// Blank values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptValues {
    /// Featured brand
    pub brand: Option<String>,
    /// Product category
    pub category: Option<String>,
    /// Comparison brand
    pub competitor: Option<String>,
}

impl PromptValues {
    /// Creates values from optional parts.
    pub fn new(
        brand: Option<String>,
        category: Option<String>,
        competitor: Option<String>,
    ) -> Self {
        Self {
            brand: present(brand),
            category: present(category),
            competitor: present(competitor),
        }
    }

    /// Fills each absent value from `fallback`.
    pub fn or(self, fallback: &PromptValues) -> Self {
        Self {
            brand: present(self.brand).or_else(|| present(fallback.brand.clone())),
            category: present(self.category).or_else(|| present(fallback.category.clone())),
            competitor: present(self.competitor).or_else(|| present(fallback.competitor.clone())),
        }
    }

    fn substitutions(&self) -> [(&'static str, String); 3] {
        [
            (BRAND_PLACEHOLDER, substitute(&self.brand, "[Brand]")),
            (CATEGORY_PLACEHOLDER, substitute(&self.category, "[Category]")),
            (
                COMPETITOR_PLACEHOLDER,
                substitute(&self.competitor, "[Competitor]"),
            ),
        ]
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Value to insert, with braces removed so substituted text never forms a placeholder.
fn substitute(value: &Option<String>, label: &str) -> String {
    value
        .as_deref()
        .map(|v| v.trim().replace(['{', '}'], ""))
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| label.to_string())
}

/// Replaces every placeholder occurrence in `template`.
///
/// Absent values fall back to `[Brand]`, `[Category]` and `[Competitor]`.
/// The result never contains a placeholder token.
///
/// # Examples
///
/// ```
/// use scaleplan_workflow::{PromptValues, fill_prompt};
///
/// let values = PromptValues::new(Some("Acme".into()), None, None);
/// let text = fill_prompt("{Featured Brand} in {Category Name}", &values);
/// assert_eq!(text, "Acme in [Category]");
/// ```
pub fn fill_prompt(template: &str, values: &PromptValues) -> String {
    let substitutions = values.substitutions();
    let mut text = template.to_string();
    // Each pass consumes the braces of at least one token and inserts none.
    while PLACEHOLDERS.iter().any(|token| text.contains(token)) {
        for (token, value) in &substitutions {
            text = text.replace(token, value);
        }
    }
    text
}
