//! Article generation: prompt assembly and the text-service call.
//!
//! One prompt per post. The section skeleton and keyword bounds are part of
//! the output contract with the static site's layout, so they live here as a
//! fixed template rather than in config.

use crate::api::Generation;
use crate::error::Result;
use crate::models::{ExtractedPage, PostRequest};
use tracing::{info, instrument, warn};

/// System message framing every chat request.
pub const SYSTEM_PROMPT: &str = "You are an expert SEO and affiliate copywriter. You write \
    persuasive, well-structured product reviews and always answer with clean Markdown only.";

/// Body used when the service answers with empty content. The post is still
/// written so the seed gets consumed; an operator fills the article in later.
pub const PLACEHOLDER_ARTICLE: &str = "# New post\n";

/// Build the single instruction prompt for one post.
pub fn build_prompt(page: &ExtractedPage, request: &PostRequest) -> String {
    format!(
        "You are writing for {audience}. Write in {language} with a {tone} tone.\n\
         \n\
         Write an SEO-optimized affiliate review article in Markdown, about 1200-1500 words, \
         based on the product information below.\n\
         \n\
         Requirements:\n\
         - An H1 title containing the primary keyword.\n\
         - A meta description of 150-160 characters directly under the title.\n\
         - An AIDA-style opening paragraph (attention, interest, desire, action).\n\
         - A pros section as a bullet list, then a cons section.\n\
         - A hands-on section describing real use of the product.\n\
         - A comparison table against one or two similar products.\n\
         - A specifications table.\n\
         - A conclusion with a clear call to action linking to {link}.\n\
         - Use the primary keyword \"{keyword}\" 4-6 times in total; do not keyword-stuff.\n\
         - Suggest alt text for each image position.\n\
         - Return ONLY the Markdown article, with no commentary around it.\n\
         \n\
         Product information:\n\
         - Title: {title}\n\
         - Description: {description}\n\
         - Affiliate link: {link}\n\
         - Page content: {body}\n",
        audience = request.audience,
        language = request.language,
        tone = request.tone,
        link = request.link,
        keyword = request.primary_keyword,
        title = page.title,
        description = page.description,
        body = page.body_text,
    )
}

/// Generate the article markdown for one post.
///
/// A transport or API failure is a hard error and aborts the run; a
/// well-formed response with empty content degrades to
/// [`PLACEHOLDER_ARTICLE`] so the pipeline still produces a file.
#[instrument(level = "info", skip_all, fields(link = %request.link))]
pub async fn generate_article(
    llm: &impl Generation,
    page: &ExtractedPage,
    request: &PostRequest,
) -> Result<String> {
    let prompt = build_prompt(page, request);
    let article = llm.chat(SYSTEM_PROMPT, &prompt).await?;

    if article.trim().is_empty() {
        warn!("text service returned empty content; using placeholder article");
        return Ok(PLACEHOLDER_ARTICLE.to_string());
    }

    info!(chars = article.chars().count(), "article generated");
    Ok(article)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AutopostError;

    fn sample_page() -> ExtractedPage {
        ExtractedPage {
            title: "Widget 9000 Pro".to_string(),
            description: "The widget to end all widgets.".to_string(),
            hero_image_url: String::new(),
            body_text: "Measures things. Ships worldwide.".to_string(),
        }
    }

    fn sample_request() -> PostRequest {
        PostRequest {
            link: "https://shop.example/widget-9000".to_string(),
            primary_keyword: "widget 9000".to_string(),
            language: "vi".to_string(),
            audience: "người dùng phổ thông".to_string(),
            tone: "thân thiện".to_string(),
            tags: vec!["review".to_string()],
        }
    }

    struct CannedLlm {
        article: &'static str,
    }

    impl Generation for CannedLlm {
        async fn chat(&self, _system: &str, _user: &str) -> Result<String> {
            Ok(self.article.to_string())
        }

        async fn generate_image(&self, _prompt: &str, _size: &str) -> Result<Option<String>> {
            Ok(None)
        }
    }

    struct FailingLlm;

    impl Generation for FailingLlm {
        async fn chat(&self, _system: &str, _user: &str) -> Result<String> {
            Err(AutopostError::Generation("service unavailable".to_string()))
        }

        async fn generate_image(&self, _prompt: &str, _size: &str) -> Result<Option<String>> {
            Ok(None)
        }
    }

    #[test]
    fn test_prompt_embeds_request_and_extraction() {
        let prompt = build_prompt(&sample_page(), &sample_request());

        assert!(prompt.contains("Write in vi"));
        assert!(prompt.contains("người dùng phổ thông"));
        assert!(prompt.contains("thân thiện tone"));
        assert!(prompt.contains("\"widget 9000\" 4-6 times"));
        assert!(prompt.contains("https://shop.example/widget-9000"));
        assert!(prompt.contains("Title: Widget 9000 Pro"));
        assert!(prompt.contains("The widget to end all widgets."));
        assert!(prompt.contains("Measures things."));
    }

    #[test]
    fn test_prompt_keeps_section_skeleton_and_length_band() {
        let prompt = build_prompt(&sample_page(), &sample_request());

        assert!(prompt.contains("1200-1500 words"));
        assert!(prompt.contains("AIDA-style"));
        assert!(prompt.contains("pros section"));
        assert!(prompt.contains("comparison table"));
        assert!(prompt.contains("specifications table"));
        assert!(prompt.contains("call to action"));
        assert!(prompt.contains("alt text"));
    }

    #[tokio::test]
    async fn test_generated_article_passes_through() {
        let llm = CannedLlm {
            article: "# Widget 9000 Pro Review\n\nGreat widget.",
        };
        let article = generate_article(&llm, &sample_page(), &sample_request())
            .await
            .unwrap();
        assert!(article.starts_with("# Widget 9000 Pro Review"));
    }

    #[tokio::test]
    async fn test_empty_content_degrades_to_placeholder() {
        let llm = CannedLlm { article: "  \n " };
        let article = generate_article(&llm, &sample_page(), &sample_request())
            .await
            .unwrap();
        assert_eq!(article, PLACEHOLDER_ARTICLE);
    }

    #[tokio::test]
    async fn test_service_error_is_hard() {
        let err = generate_article(&FailingLlm, &sample_page(), &sample_request())
            .await
            .unwrap_err();
        assert!(matches!(err, AutopostError::Generation(_)));
    }
}
