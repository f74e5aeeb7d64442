//! README文档生成

use chrono::Utc;

use crate::generator::template::{
    bullet_list, image_list, record_json, spec_list, value_or_placeholder,
};
use crate::generator::types::{GenerationOutcome, GenerationStage, PromptTemplate};
use crate::i18n::TargetLanguage;
use crate::llm::TextGenerator;
use crate::logging::RequestLog;
use crate::types::product::ProductRecord;

/// README生成器，依赖对比阶段的输出
pub struct ReadmeGenerator<'a> {
    llm: &'a dyn TextGenerator,
    language: &'a TargetLanguage,
    log: &'a RequestLog,
}

impl<'a> ReadmeGenerator<'a> {
    pub fn new(
        llm: &'a dyn TextGenerator,
        language: &'a TargetLanguage,
        log: &'a RequestLog,
    ) -> Self {
        Self { llm, language, log }
    }

    pub fn prompt_template() -> PromptTemplate {
        PromptTemplate {
            system_prompt: r#"You are a technical writer who turns product research into a polished README.md document. Output GitHub-flavored Markdown only, starting with a single level-1 title."#
                .to_string(),
            opening_instruction: "Write a complete README document for the product comparison below. The product data was scraped from several sources and merged; the comparison was written in an earlier step."
                .to_string(),
            closing_instruction: r#"The README must contain, in order:
1. A title
2. An overview of both products
3. A specifications section for each product
4. A feature comparison section (a table is welcome)
5. The detailed comparison, adapted but not shortened
6. A conclusion
7. A short methodology note explaining that data was aggregated from multiple scraping sources"#
                .to_string(),
        }
    }

    pub fn build_user_prompt(
        &self,
        product1: &ProductRecord,
        product2: &ProductRecord,
        comparison: &str,
    ) -> String {
        let body = format!(
            "## Product 1: {}\n```json\n{}\n```\n\n## Product 2: {}\n```json\n{}\n```\n\n## Comparison\n{}",
            product1.name,
            record_json(product1),
            product2.name,
            record_json(product2),
            comparison
        );
        Self::prompt_template().build_user_prompt(&body, self.language)
    }

    /// 生成README，不会失败
    pub async fn generate(
        &self,
        product1: &ProductRecord,
        product2: &ProductRecord,
        comparison: &str,
    ) -> GenerationOutcome {
        let user_prompt = self.build_user_prompt(product1, product2, comparison);
        Self::prompt_template()
            .generate_or_fallback(
                self.llm,
                GenerationStage::Document,
                &user_prompt,
                self.log,
                || render_fallback_readme(product1, product2, comparison),
            )
            .await
    }
}

fn product_section(record: &ProductRecord) -> String {
    format!(
        "### {}\n\n- **Price**: {}\n- **Rating**: {}\n- **Availability**: {}\n\n{}\n\n#### Specifications\n\n{}\n#### Images\n\n{}",
        record.name,
        value_or_placeholder(&record.price),
        value_or_placeholder(&record.rating),
        value_or_placeholder(&record.availability),
        value_or_placeholder(&record.description),
        spec_list(&record.specifications),
        image_list(record),
    )
}

/// 兜底的README模板
pub fn render_fallback_readme(
    product1: &ProductRecord,
    product2: &ProductRecord,
    comparison: &str,
) -> String {
    let mut out = format!(
        "# Product Comparison: {} vs {}\n\n",
        product1.name, product2.name
    );

    out.push_str(&format!(
        "## Overview\n\nThis document compares **{}** and **{}** using product data aggregated from multiple sources. It covers pricing, specifications and features to help you choose between them.\n\n",
        product1.name, product2.name
    ));

    out.push_str("## Product Specifications\n\n");
    out.push_str(&product_section(product1));
    out.push('\n');
    out.push_str(&product_section(product2));

    out.push_str("\n## Feature Comparison\n");
    for p in [product1, product2] {
        out.push_str(&format!("\n### {}\n\n{}", p.name, bullet_list(&p.features)));
    }

    let comparison = comparison.trim();
    out.push_str(&format!(
        "\n## Detailed Comparison\n\n{}\n\n",
        if comparison.is_empty() {
            crate::generator::template::NOT_AVAILABLE
        } else {
            comparison
        }
    ));

    out.push_str(&format!(
        "## Conclusion\n\n{} and {} each serve different priorities. Review the specifications and feature lists above, then pick the product that best matches your budget and intended use.\n\n",
        product1.name, product2.name
    ));

    out.push_str(&format!(
        "## Methodology\n\nProduct data was collected from the selected scraping sources and merged into one record per product. Where a source failed, estimated values were substituted; these are marked \"(estimated)\". Generated on {}.\n\n",
        Utc::now().format("%Y-%m-%d")
    ));

    out.push_str("---\n\n*This README was generated in fallback mode because the AI service was unavailable.*\n");

    out
}
