pub mod catalog;
pub mod providers;
pub mod ranking_catalog;
pub mod recommendation;
pub mod review_ranking;
pub mod sentiment;

pub use catalog::CatalogService;
pub use ranking_catalog::RankingCatalog;
pub use recommendation::RecommendationEngine;
pub use review_ranking::ReviewRankingService;
pub use sentiment::SentimentClassifier;
