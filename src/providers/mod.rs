pub mod clarifai;
pub mod openai;
pub mod traits;

// Re-export common types
pub use clarifai::clarifai::ClarifaiClient;
pub use openai::openai::OpenAIAdvisor;
pub use traits::AdviceProvider;
