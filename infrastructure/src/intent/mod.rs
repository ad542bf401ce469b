//! Intent classification adapters.

mod keyword;

pub use keyword::KeywordIntentClassifier;
