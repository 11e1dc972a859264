#[path = "integration/scenarios.rs"]
mod scenarios;
#[path = "integration/pipeline.rs"]
mod pipeline;
#[path = "integration/declarations.rs"]
mod declarations;
#[path = "integration/properties.rs"]
mod properties;
