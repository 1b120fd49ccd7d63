use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::{debug, info, warn};
use ns_core::{ArticleSource, RawArticle};

/// Articles shorter than this are almost certainly navigation chrome or a
/// consent wall, not the story itself.
const MIN_CONTENT_LEN: usize = 100;
/// Hard cap on stored content per article.
const MAX_CONTENT_LEN: usize = 5000;
/// How many result links to collect before per-article scraping thins
/// them out.
const LINK_FETCH_LIMIT: usize = 20;

const UNREADABLE_CONTENT: &str = "Unable to extract meaningful content from this webpage.";

const BLOCKED_DOMAINS: [&str; 4] = [
    "youtube.com",
    "facebook.com",
    "twitter.com",
    "instagram.com",
];

/// Scrapes news-search results for a company and the linked articles.
/// Every failure is swallowed and only shrinks the result set.
pub struct GoogleNewsSource {
    client: reqwest::Client,
}

impl GoogleNewsSource {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
            )
            .build()
            .unwrap_or_default();
        Self { client }
    }

    async fn get_news_links(&self, company_name: &str, max_links: usize) -> Vec<String> {
        let query = company_name.replace(' ', "+");
        let url = format!("https://www.google.com/search?q={}+news&tbm=nws&num=100", query);

        let html = match self.client.get(&url).send().await {
            Ok(response) => match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!("Failed to read news search results for {}: {}", company_name, e);
                    return Vec::new();
                }
            },
            Err(e) => {
                warn!("Failed to fetch news search results for {}: {}", company_name, e);
                return Vec::new();
            }
        };

        extract_result_links(&html, max_links)
    }

    async fn scrape_article(&self, url: &str) -> Option<RawArticle> {
        let html = match self.client.get(url).send().await {
            Ok(response) => match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!("Failed to read article at {}: {}", url, e);
                    return None;
                }
            },
            Err(e) => {
                warn!("Failed to fetch article at {}: {}", url, e);
                return None;
            }
        };

        let article = extract_article(url, &html);
        if article.content == UNREADABLE_CONTENT {
            debug!("Skipping unreadable article: {}", url);
            return None;
        }
        Some(article)
    }
}

impl Default for GoogleNewsSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArticleSource for GoogleNewsSource {
    async fn fetch(&self, company_name: &str, max_count: usize) -> Vec<RawArticle> {
        let links = self.get_news_links(company_name, LINK_FETCH_LIMIT).await;
        let mut articles = Vec::new();

        for link in links {
            if articles.len() >= max_count {
                break;
            }
            if let Some(article) = self.scrape_article(&link).await {
                articles.push(article);
            }
        }

        info!("📰 Scraped {} articles for {}", articles.len(), company_name);
        articles
    }
}

/// Pull article links out of a news-search results page, unwrapping
/// redirect URLs and dropping social-media domains.
fn extract_result_links(html: &str, max_links: usize) -> Vec<String> {
    let document = Html::parse_document(html);
    let result_selector = Selector::parse("div.SoaBEf").unwrap();
    let anchor_selector = Selector::parse("a").unwrap();

    let mut links = Vec::new();
    for result in document.select(&result_selector) {
        let Some(href) = result
            .select(&anchor_selector)
            .next()
            .and_then(|a| a.value().attr("href"))
        else {
            continue;
        };

        let link = if href.starts_with("/url?") {
            match unwrap_redirect(href) {
                Some(target) => target,
                None => continue,
            }
        } else {
            href.to_string()
        };

        if BLOCKED_DOMAINS.iter().any(|domain| link.contains(domain)) {
            continue;
        }

        links.push(link);
        if links.len() >= max_links {
            break;
        }
    }
    links
}

/// Extract the target of a `/url?...&url=<target>&...` redirect link.
fn unwrap_redirect(href: &str) -> Option<String> {
    let full = format!("https://www.google.com{}", href);
    let parsed = url::Url::parse(&full).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "url")
        .map(|(_, value)| value.into_owned())
}

/// Extract title and body text from an article page. Prefers `<article>`
/// content, falls back to every `<p>` on the page.
fn extract_article(url: &str, html: &str) -> RawArticle {
    let document = Html::parse_document(html);

    let title = document
        .select(&Selector::parse("title").unwrap())
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "No title found".to_string());

    let text_selector = Selector::parse("p, h1, h2, h3").unwrap();
    let article_selector = Selector::parse("article").unwrap();
    let paragraph_selector = Selector::parse("p").unwrap();

    let content = if let Some(article_el) = document.select(&article_selector).next() {
        article_el
            .select(&text_selector)
            .map(|el| el.text().collect::<String>())
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        document
            .select(&paragraph_selector)
            .map(|el| el.text().collect::<String>())
            .collect::<Vec<_>>()
            .join(" ")
    };

    let content = normalize_whitespace(&content);
    let content = if content.len() < MIN_CONTENT_LEN {
        UNREADABLE_CONTENT.to_string()
    } else {
        truncate_chars(&content, MAX_CONTENT_LEN)
    };

    RawArticle {
        url: url.to_string(),
        title,
        content,
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_result_links_unwraps_redirects() {
        let html = r#"
            <html><body>
                <div class="SoaBEf"><a href="/url?q=x&url=https%3A%2F%2Fnews.example.com%2Fstory&sa=y">Story</a></div>
                <div class="SoaBEf"><a href="https://other.example.com/direct">Direct</a></div>
                <div class="SoaBEf"><a href="https://www.youtube.com/watch?v=1">Video</a></div>
            </body></html>
        "#;
        let links = extract_result_links(html, 10);
        assert_eq!(
            links,
            vec![
                "https://news.example.com/story".to_string(),
                "https://other.example.com/direct".to_string(),
            ]
        );
    }

    #[test]
    fn test_extract_result_links_respects_limit() {
        let html = r#"
            <html><body>
                <div class="SoaBEf"><a href="https://a.example.com/1">1</a></div>
                <div class="SoaBEf"><a href="https://a.example.com/2">2</a></div>
                <div class="SoaBEf"><a href="https://a.example.com/3">3</a></div>
            </body></html>
        "#;
        assert_eq!(extract_result_links(html, 2).len(), 2);
    }

    #[test]
    fn test_extract_article_prefers_article_tag() {
        let body = "word ".repeat(50);
        let html = format!(
            "<html><head><title>Big News</title></head><body>\
             <p>navigation link soup</p>\
             <article><h1>Headline</h1><p>{}</p></article>\
             </body></html>",
            body
        );
        let article = extract_article("https://news.example.com/story", &html);
        assert_eq!(article.title, "Big News");
        assert!(article.content.starts_with("Headline word"));
        assert!(!article.content.contains("navigation link soup"));
    }

    #[test]
    fn test_extract_article_flags_thin_content() {
        let html = "<html><head><title>Thin</title></head><body><p>too short</p></body></html>";
        let article = extract_article("https://news.example.com/thin", html);
        assert_eq!(article.content, UNREADABLE_CONTENT);
    }

    #[test]
    fn test_extract_article_caps_content_length() {
        let body = "x".repeat(9000);
        let html = format!("<html><head><title>Long</title></head><body><p>{}</p></body></html>", body);
        let article = extract_article("https://news.example.com/long", &html);
        assert_eq!(article.content.chars().count(), MAX_CONTENT_LEN);
    }
}
