use page_harvest::{extract_html, ChunkKind, ContentType, ExtractionResult, Importance};

pub const NEWS_URL: &str = "https://news.coastaltimes.example/2026/harbour-expansion";

pub const NEWS_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Harbour expansion approved | Coastal Times</title>
<meta property="og:title" content="Harbour expansion approved after two-year review">
<meta name="description" content="The port authority approved the harbour expansion on Tuesday after a lengthy public consultation.">
<style>body { font-family: Georgia, serif; }</style>
</head>
<body>
<nav class="site-nav"><ul><li><a href="/">Home</a></li><li><a href="/local">Local news</a></li><li><a href="/sport">Sport</a></li><li><a href="/weather">Weather</a></li></ul></nav>
<div class="cookie-banner"><p>We use cookies to personalise content and to analyse our traffic.</p><button>Accept all</button></div>
<main>
<article>
<h1>Harbour expansion approved after two-year review</h1>
<p>The port authority voted on Tuesday evening to approve a long-debated expansion of the eastern harbour, ending a review process that began almost two years ago and drew more than four thousand written responses from residents, fishing crews and shipping companies.</p>
<p>Under the approved plan, the breakwater will be extended by roughly three hundred metres and two new berths will be built for cargo vessels. Construction is expected to begin next spring and to continue in phases over the following four years.</p>
<p>Supporters of the scheme argued that larger ships currently bypass the town entirely, taking jobs and business with them. Opponents raised concerns about dredging, the effect on seabird colonies along the northern cliffs and the noise from night-time loading.</p>
<p>The authority said it had added conditions to address those concerns, including seasonal limits on dredging, an independent ecological monitoring panel and a ban on loading between midnight and five in the morning during the summer months.</p>
<p>Local councillor Mary Hughes welcomed the decision but said residents would be watching closely. She told the meeting that the town had been promised investment before and that this time the commitments needed to be written down and enforced.</p>
<h2>What happens next for local businesses</h2>
<p>Traders on the harbour front will be offered a consultation session next month covering access routes during construction. The authority has also promised a small grants scheme for businesses that can show a loss of trade while the works are under way.</p>
</article>
<aside class="sidebar">
<h3>Most read stories this week</h3>
<ul><li>Lifeboat crew rescue stranded walkers near the lighthouse</li><li>New bus timetable starts on Monday morning</li></ul>
</aside>
<section class="comments">
<p>Great news for the town at last, this should have happened years ago.</p>
<p>I worry about the birds on the cliffs, hope the monitoring panel has real power.</p>
</section>
</main>
<footer><p>Copyright 2026 Coastal Times. All rights reserved worldwide.</p><p>Registered office: 12 Quay Street.</p></footer>
<script>window.dataLayer = window.dataLayer || []; dataLayer.push({ page: "article" });</script>
</body>
</html>"#;

fn news() -> ExtractionResult {
    let result = extract_html(NEWS_PAGE, Some(NEWS_URL));
    assert!(result.success, "extraction failed: {:?}", result.error);
    result
}

#[test]
fn news_article_keeps_only_story_text() {
    let result = news();
    let kinds: Vec<String> = result.chunks.iter().map(|c| c.kind.to_string()).collect();
    assert_eq!(kinds, vec!["h1", "h2", "p", "p", "p", "p", "p", "p"]);

    let all_text: String = result.chunks.iter().map(|c| c.content.as_str()).collect();
    for leaked in [
        "Local news",
        "cookies",
        "Most read",
        "Lifeboat",
        "Great news for the town",
        "Copyright",
        "dataLayer",
        "font-family",
    ] {
        assert!(!all_text.contains(leaked), "{leaked} leaked into the chunks");
    }
}

#[test]
fn news_article_ranks_and_tracks_headings() {
    let result = news();
    assert_eq!(result.chunks[0].importance, Importance::High);
    assert_eq!(result.chunks[1].importance, Importance::High);
    assert!(result.chunks[2..].iter().all(|c| c.importance == Importance::Medium));

    let last = result.chunks.last().unwrap();
    assert!(last.content.starts_with("Traders on the harbour front"));
    assert_eq!(last.heading, "What happens next for local businesses");
    assert_eq!(
        result.chunks[2].heading,
        "Harbour expansion approved after two-year review"
    );
    let orders: Vec<usize> = result.chunks[2..].iter().map(|c| c.order).collect();
    assert!(orders.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn news_article_metadata() {
    let meta = news().metadata.unwrap();
    assert_eq!(meta.title, "Harbour expansion approved after two-year review");
    assert!(meta.description.starts_with("The port authority approved"));
    assert_eq!(meta.language, "en");
    assert_eq!(meta.domain, "news.coastaltimes.example");
    assert_eq!(meta.content_type, ContentType::News);
    assert!(meta.word_count > 250);
}

#[test]
fn news_article_is_suitable() {
    let result = news();
    assert!(result.total_words >= 200);
    assert!(result.suitable);
    let quality = result.quality.unwrap();
    assert!(quality.is_content_rich);
    assert!(quality.has_structure);
    assert!(quality.rag_ready);
    let stats = result.extraction.unwrap();
    assert_eq!(stats.fallback_nodes_used, 0);
    assert!(result.chunks.iter().all(|c| c.kind != ChunkKind::TextNode));
}
