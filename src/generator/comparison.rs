//! 产品对比生成

use crate::generator::template::{
    bullet_list, image_list, record_json, spec_list, value_or_placeholder,
};
use crate::generator::types::{GenerationOutcome, GenerationStage, PromptTemplate};
use crate::i18n::TargetLanguage;
use crate::llm::TextGenerator;
use crate::logging::RequestLog;
use crate::types::product::ProductRecord;

/// 对比生成器：优先由模型撰写，失败时使用确定性的Markdown模板
pub struct ComparisonGenerator<'a> {
    llm: &'a dyn TextGenerator,
    language: &'a TargetLanguage,
    log: &'a RequestLog,
}

impl<'a> ComparisonGenerator<'a> {
    pub fn new(
        llm: &'a dyn TextGenerator,
        language: &'a TargetLanguage,
        log: &'a RequestLog,
    ) -> Self {
        Self { llm, language, log }
    }

    pub fn prompt_template() -> PromptTemplate {
        PromptTemplate {
            system_prompt: r#"You are an experienced consumer-electronics reviewer. You write fair, well-structured product comparisons in Markdown for shoppers who are deciding between two products.

Rules:
- Only use the product data you are given. Values marked "(estimated)" are approximations; say so when you rely on them.
- If a field is missing, say it is not available instead of inventing a value.
- Use Markdown headings and bullet lists; no HTML."#
                .to_string(),
            opening_instruction: "Compare the following two products based on the scraped product data below."
                .to_string(),
            closing_instruction: r#"Structure the comparison with these sections:
1. Price comparison
2. Key features
3. Specifications
4. Pros and cons of each product
5. Recommendation: which product suits which kind of buyer"#
                .to_string(),
        }
    }

    /// 构造用户提示词
    pub fn build_user_prompt(&self, product1: &ProductRecord, product2: &ProductRecord) -> String {
        let body = format!(
            "## Product 1: {}\n```json\n{}\n```\n\n## Product 2: {}\n```json\n{}\n```",
            product1.name,
            record_json(product1),
            product2.name,
            record_json(product2)
        );
        Self::prompt_template().build_user_prompt(&body, self.language)
    }

    /// 生成对比文本，不会失败
    pub async fn generate(
        &self,
        product1: &ProductRecord,
        product2: &ProductRecord,
    ) -> GenerationOutcome {
        let user_prompt = self.build_user_prompt(product1, product2);
        Self::prompt_template()
            .generate_or_fallback(
                self.llm,
                GenerationStage::Comparison,
                &user_prompt,
                self.log,
                || render_fallback_comparison(product1, product2),
            )
            .await
    }
}

/// 兜底的对比模板
pub fn render_fallback_comparison(product1: &ProductRecord, product2: &ProductRecord) -> String {
    let mut out = format!(
        "# {} vs {}\n\n",
        product1.name, product2.name
    );

    out.push_str("## Price Comparison\n\n");
    for p in [product1, product2] {
        out.push_str(&format!(
            "- **{}**: {}\n",
            p.name,
            value_or_placeholder(&p.price)
        ));
    }

    out.push_str("\n## Ratings\n\n");
    for p in [product1, product2] {
        out.push_str(&format!(
            "- **{}**: {}\n",
            p.name,
            value_or_placeholder(&p.rating)
        ));
    }

    out.push_str("\n## Overview\n\n");
    for p in [product1, product2] {
        out.push_str(&format!(
            "- **{}**: {}\n",
            p.name,
            value_or_placeholder(&p.description)
        ));
    }

    out.push_str("\n## Features\n");
    for p in [product1, product2] {
        out.push_str(&format!("\n### {}\n\n{}", p.name, bullet_list(&p.features)));
    }

    out.push_str("\n## Specifications\n");
    for p in [product1, product2] {
        out.push_str(&format!("\n### {}\n\n{}", p.name, spec_list(&p.specifications)));
    }

    out.push_str("\n## Availability\n\n");
    for p in [product1, product2] {
        out.push_str(&format!(
            "- **{}**: {}\n",
            p.name,
            value_or_placeholder(&p.availability)
        ));
    }

    out.push_str("\n## Images\n");
    for p in [product1, product2] {
        out.push_str(&format!("\n### {}\n\n{}", p.name, image_list(p)));
    }

    out.push_str(&format!(
        "\n## Recommendation\n\nBoth {} and {} have their strengths. Weigh the price, features and specifications above against your own needs and budget, and check current retailer listings before buying.\n\n",
        product1.name, product2.name
    ));
    out.push_str("> **Note:** This comparison was generated in fallback mode because the AI service was unavailable. Some values may be estimated and the analysis is less detailed than usual.\n");

    out
}
