/// Starter prompts offered while the conversation is still empty.
pub const SUGGESTIONS: [&str; 6] = [
    "Show me Nike shoes under ₹5,000",
    "What is your return policy?",
    "Puma running shoes with 40%+ discount",
    "Ladies shoes under ₹2,000",
    "Top rated shoes with rating above 4.5",
    "How do I track my order?",
];
