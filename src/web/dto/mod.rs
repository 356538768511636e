pub mod courses;
pub mod quizzes;
pub mod survey;
