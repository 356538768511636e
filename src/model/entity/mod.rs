mod user;
pub use user::{UserEntity, UserEntityCreateUpdate};

mod course;
pub use course::{Course, CourseCreate};

mod lesson;
pub use lesson::{Lesson, LessonCreate};

mod quiz;
pub use quiz::{Quiz, QuizCreate};

mod survey;
pub use survey::{SurveyResponse, SurveyResponseUpsert};

mod quiz_progress;
pub use quiz_progress::{QuizProgress, QuizProgressUpsert};
