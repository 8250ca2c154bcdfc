mod analytics;
mod progress;
mod service;
mod throttle;

pub use progress::SessionProgress;
pub use service::QuizService;
pub use throttle::EventThrottle;
