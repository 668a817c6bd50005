/// Splits `bytes` at each offset, the way a network would chunk a body.
/// Offsets are sorted and clamped, and empty chunks are never produced.
pub fn split_at_offsets(bytes: &[u8], offsets: &[usize]) -> Vec<Vec<u8>> {
    let mut cuts = offsets
        .iter()
        .map(|offset| return (*offset).min(bytes.len()))
        .collect::<Vec<usize>>();
    cuts.sort_unstable();
    cuts.dedup();

    let mut chunks = vec![];
    let mut start = 0;
    for cut in cuts.into_iter().chain(std::iter::once(bytes.len())) {
        if cut > start {
            chunks.push(bytes[start..cut].to_vec());
            start = cut;
        }
    }

    return chunks;
}

pub fn answer_fixture() -> &'static str {
    return r#"
Here are some running shoes under ₹5,000:

1. **Nike Revolution 6**: Rs. 2,495 👟
2. **Adidas Duramo SL**: Rs. 3,999
3. **Puma Softride**: Rs. 4,299

Want me to narrow these down by size?
"#
    .trim();
}

pub fn admin_stats_fixture() -> &'static str {
    return r#"{
  "uptime": "1h 2m 3s",
  "uptime_seconds": 3723,
  "sessions": { "active": 2, "total_stored": 5, "ttl_minutes": 30 },
  "chromadb": { "status": "ok", "collection": "faqs", "faq_documents": 42 },
  "sqlite": { "status": "ok", "product_count": 1280 },
  "router": { "available_routes": ["faq", "sql"] }
}"#;
}
