// Adapters for the two external services: the text-generation API and the
// destination REST endpoint.

pub mod completion;
pub mod destination;
