use serde::Serialize;
use uuid::Uuid;

use crate::{
    model::entity::{Course, Lesson},
    progress::{ProgressMap, is_unlocked},
};

#[derive(Serialize, utoipa::ToSchema)]
pub struct CourseResponse {
    id: Uuid,
    name: String,
    pace: i32,
    lessons: Vec<LessonItem>,
}

/// A lesson as the course page sees it. Locked lessons keep their title
/// visible but never ship their content.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LessonItem {
    lesson_number: i32,
    title: String,
    unlocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

impl CourseResponse {
    pub fn build(course: &Course, lessons: Vec<Lesson>, progress: &ProgressMap) -> Self {
        let lessons = lessons
            .into_iter()
            .map(|lesson| {
                let unlocked = is_unlocked(lesson.lesson_number(), progress);
                LessonItem {
                    lesson_number: lesson.lesson_number(),
                    title: lesson.title().to_string(),
                    unlocked,
                    content: unlocked.then(|| lesson.content().to_string()),
                }
            })
            .collect();

        Self {
            id: course.id(),
            name: course.name().to_string(),
            pace: course.pace(),
            lessons,
        }
    }
}
