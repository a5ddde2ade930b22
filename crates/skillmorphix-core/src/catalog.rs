use crate::profile::Grade;
use anyhow::{Context, Result};
use chrono::{Days, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Points a JSON file that replaces the built-in catalog
pub const CATALOG_ENV: &str = "SKILLMORPHIX_CATALOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Subject {
    pub id: u32,
    pub name: String,
    pub icon: String,
    pub description: String,
    /// Percent complete, 0..=100
    pub progress: u8,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Lesson {
    pub id: u32,
    pub subject_id: u32,
    pub title: String,
    pub description: String,
    pub duration_minutes: u32,
    pub difficulty: Difficulty,
    pub completed: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Video {
    pub id: String,
    pub subject_id: u32,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    /// "mm:ss"
    pub duration: String,
    pub category: String,
    pub difficulty: Difficulty,
}

/// What the video player shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoDetails {
    pub id: String,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub related_topics: Vec<String>,
}

impl VideoDetails {
    /// Context hint handed to the chat, subject first
    pub fn chat_context(&self) -> String {
        format!("{}: {}", self.category, self.title)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Class,
    Lab,
    Assignment,
    Exam,
    Meeting,
}

impl EventKind {
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Class => "class",
            EventKind::Lab => "lab",
            EventKind::Assignment => "assignment",
            EventKind::Exam => "exam",
            EventKind::Meeting => "meeting",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ScheduleEvent {
    pub id: u32,
    pub title: String,
    /// Days after today; the schedule is always relative to when it is viewed
    pub day_offset: u64,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub kind: EventKind,
    pub description: String,
    pub teacher: String,
    pub location: String,
}

impl ScheduleEvent {
    pub fn date(&self, today: NaiveDate) -> Option<NaiveDate> {
        today.checked_add_days(Days::new(self.day_offset))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SubjectProgress {
    pub name: String,
    pub progress: u8,
    pub status: String,
    pub description: String,
    /// Hex colour, "#RRGGBB"
    pub color: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Skill {
    pub name: String,
    pub level: String,
    pub progress: u8,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Achievement {
    pub title: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ProgressSummary {
    pub overall_progress: u8,
    pub completed_lessons: u32,
    pub hours_spent: u32,
    pub subjects_in_progress: u32,
    pub skills_mastered: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ProgressReport {
    pub summary: ProgressSummary,
    pub subjects: Vec<SubjectProgress>,
    pub skills: Vec<Skill>,
    pub achievements: Vec<Achievement>,
}

/// All static learning content
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Catalog {
    subjects: Vec<Subject>,
    lessons: Vec<Lesson>,
    videos: Vec<Video>,
    schedule: Vec<ScheduleEvent>,
    progress: ProgressReport,
}

impl Catalog {
    pub async fn load_from_json(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        let catalog: Catalog = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse catalog {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            subjects = catalog.subjects.len(),
            videos = catalog.videos.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Every grade currently sees the same subjects.
    pub fn subjects_for_grade(&self, _grade: Grade) -> &[Subject] {
        &self.subjects
    }

    pub fn subject(&self, id: u32) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == id)
    }

    pub fn lessons_for_subject(&self, subject_id: u32) -> Vec<&Lesson> {
        self.lessons
            .iter()
            .filter(|l| l.subject_id == subject_id)
            .collect()
    }

    pub fn has_videos(&self, subject_id: u32) -> bool {
        self.videos.iter().any(|v| v.subject_id == subject_id)
    }

    /// The subject the dashboard suggests starting with
    pub fn recommended_subject(&self) -> Option<&Subject> {
        self.subjects.iter().find(|s| self.has_videos(s.id))
    }

    pub fn videos(&self, difficulty: Option<Difficulty>) -> Vec<&Video> {
        self.videos
            .iter()
            .filter(|v| difficulty.map_or(true, |d| v.difficulty == d))
            .collect()
    }

    pub fn video(&self, id: &str) -> Option<&Video> {
        self.videos.iter().find(|v| v.id == id)
    }

    pub fn video_details(&self, id: &str) -> Option<VideoDetails> {
        let video = self.video(id)?;
        let subject = self
            .subject(video.subject_id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| video.category.clone());

        Some(VideoDetails {
            id: video.id.clone(),
            title: video.title.clone(),
            description: video.description.clone(),
            video_url: format!("https://example.com/videos/{}.mp4", video.id),
            category: subject,
            difficulty: video.difficulty,
            related_topics: related_topics(&video.category),
        })
    }

    /// Events on `date`, earliest start first
    pub fn events_on(&self, today: NaiveDate, date: NaiveDate) -> Vec<&ScheduleEvent> {
        let mut events: Vec<&ScheduleEvent> = self
            .schedule
            .iter()
            .filter(|e| e.date(today) == Some(date))
            .collect();
        events.sort_by_key(|e| (e.start_time, e.id));
        events
    }

    pub fn has_events(&self, today: NaiveDate, date: NaiveDate) -> bool {
        self.schedule.iter().any(|e| e.date(today) == Some(date))
    }

    pub fn progress(&self) -> &ProgressReport {
        &self.progress
    }

    pub fn builtin() -> Self {
        Self {
            subjects: builtin_subjects(),
            lessons: builtin_lessons(),
            videos: builtin_videos(),
            schedule: builtin_schedule(),
            progress: builtin_progress(),
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn related_topics(category: &str) -> Vec<String> {
    let topics: &[&str] = match category {
        "arithmetic" => &["Decimals", "Percentages", "Ratios", "Problem Solving"],
        "algebra" => &["Variables", "Inequalities", "Graphing Lines", "Problem Solving"],
        "geometry" => &["Triangles", "Area and Perimeter", "Angles", "Problem Solving"],
        "calculus" => &["Limits", "Slopes", "Rates of Change", "Problem Solving"],
        _ => &["Problem Solving"],
    };
    topics.iter().map(|t| t.to_string()).collect()
}

fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

fn builtin_subjects() -> Vec<Subject> {
    let rows = [
        (1, "Mathematics", "📊", "Learn numbers, operations, geometry and more", 25),
        (2, "Science", "🔬", "Explore nature, physics, chemistry and biology", 10),
        (3, "Language Arts", "📚", "Reading, writing, grammar and vocabulary", 30),
        (4, "Social Studies", "🌎", "History, geography and social sciences", 15),
    ];
    rows.into_iter()
        .map(|(id, name, icon, description, progress)| Subject {
            id,
            name: name.to_string(),
            icon: icon.to_string(),
            description: description.to_string(),
            progress,
        })
        .collect()
}

fn builtin_lessons() -> Vec<Lesson> {
    let rows = [
        (1, "Introduction to Numbers", "Learn about counting and basic operations", 20, Difficulty::Beginner, true),
        (2, "Addition and Subtraction", "Master the basic arithmetic operations", 25, Difficulty::Beginner, false),
        (3, "Multiplication Tables", "Learn multiplication from 1 to 10", 30, Difficulty::Intermediate, false),
    ];
    rows.into_iter()
        .map(|(id, title, description, duration_minutes, difficulty, completed)| Lesson {
            id,
            subject_id: 1,
            title: title.to_string(),
            description: description.to_string(),
            duration_minutes,
            difficulty,
            completed,
        })
        .collect()
}

fn builtin_videos() -> Vec<Video> {
    let rows = [
        ("math-001", "Introduction to Fractions", "Learn the basics of fractions and how they represent parts of a whole.", "Fractions", "12:30", "arithmetic", Difficulty::Beginner),
        ("math-002", "Solving Linear Equations", "Master the techniques to solve simple linear equations step by step.", "Linear+Equations", "15:45", "algebra", Difficulty::Intermediate),
        ("math-003", "Pythagorean Theorem", "Understand the fundamental relationship between the sides of a right triangle.", "Pythagoras", "10:15", "geometry", Difficulty::Intermediate),
        ("math-004", "Basic Addition and Subtraction", "Master the fundamental operations of addition and subtraction with numbers.", "Addition", "08:20", "arithmetic", Difficulty::Beginner),
        ("math-005", "Advanced Calculus: Derivatives", "Learn about rates of change and the fundamental concepts of calculus.", "Calculus", "18:50", "calculus", Difficulty::Advanced),
        ("math-006", "Multiplication Tables", "Memorize multiplication tables from 1 to 12 with helpful techniques.", "Multiplication", "11:10", "arithmetic", Difficulty::Beginner),
    ];
    rows.into_iter()
        .map(|(id, title, description, thumb, duration, category, difficulty)| Video {
            id: id.to_string(),
            subject_id: 1,
            title: title.to_string(),
            description: description.to_string(),
            thumbnail_url: format!("https://placehold.co/320x180/indigo/white?text={}", thumb),
            duration: duration.to_string(),
            category: category.to_string(),
            difficulty,
        })
        .collect()
}

fn builtin_schedule() -> Vec<ScheduleEvent> {
    let rows = [
        (1, "Mathematics - Advanced Algebra", 1, time(10, 0), time(11, 30), EventKind::Class,
         "Live session covering quadratic equations and their applications.", "Dr. Smith", "Virtual Room 3"),
        (2, "Physics Lab Work", 3, time(14, 0), time(15, 30), EventKind::Lab,
         "Practical experiments on motion and forces.", "Prof. Johnson", "Science Lab 2"),
        (3, "Literature Essay Submission", 2, time(23, 59), time(23, 59), EventKind::Assignment,
         "Submit your analysis of 'To Kill a Mockingbird' chapter 5-10.", "Ms. Davis", "Online Portal"),
        (4, "Chemistry Quiz", 0, time(9, 0), time(10, 0), EventKind::Exam,
         "Quiz on periodic table and chemical bonding.", "Dr. Wilson", "Room 205"),
        (5, "Group Project Meeting", 1, time(15, 0), time(16, 0), EventKind::Meeting,
         "Discuss progress on the history research project.", "Self-organized", "Study Room 4"),
    ];
    rows.into_iter()
        .map(|(id, title, day_offset, start_time, end_time, kind, description, teacher, location)| {
            ScheduleEvent {
                id,
                title: title.to_string(),
                day_offset,
                start_time,
                end_time,
                kind,
                description: description.to_string(),
                teacher: teacher.to_string(),
                location: location.to_string(),
            }
        })
        .collect()
}

fn builtin_progress() -> ProgressReport {
    let subjects = [
        ("Mathematics", 85, "Excellent", "Advanced topics in algebra and calculus.", "#4CAF50"),
        ("Science", 60, "Good", "Exploring physics, chemistry, and biology.", "#2196F3"),
        ("History", 40, "Improving", "World history and significant events.", "#FF9800"),
        ("Literature", 75, "Very Good", "Classic and contemporary literature analysis.", "#9C27B0"),
    ]
    .into_iter()
    .map(|(name, progress, status, description, color)| SubjectProgress {
        name: name.to_string(),
        progress,
        status: status.to_string(),
        description: description.to_string(),
        color: color.to_string(),
    })
    .collect();

    let skills = [
        ("Problem Solving", "Advanced", 90, "Complex problem-solving techniques."),
        ("Critical Thinking", "Intermediate", 65, "Analyzing and evaluating information."),
        ("Creative Writing", "Beginner", 30, "Expressing ideas through writing."),
    ]
    .into_iter()
    .map(|(name, level, progress, description)| Skill {
        name: name.to_string(),
        level: level.to_string(),
        progress,
        description: description.to_string(),
    })
    .collect();

    let achievements = [
        ("Math Whiz", "Scored 100% on the last math quiz.", "🥇"),
        ("Science Explorer", "Completed all science experiments.", "🧪"),
        ("History Buff", "Participated actively in history discussions.", "📜"),
    ]
    .into_iter()
    .map(|(title, description, icon)| Achievement {
        title: title.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
    })
    .collect();

    ProgressReport {
        summary: ProgressSummary {
            overall_progress: 70,
            completed_lessons: 45,
            hours_spent: 60,
            subjects_in_progress: 3,
            skills_mastered: 12,
        },
        subjects,
        skills,
        achievements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    #[test]
    fn test_builtin_subjects() {
        let catalog = Catalog::builtin();
        let subjects = catalog.subjects_for_grade(Grade::new(4).unwrap());
        let names: Vec<&str> = subjects.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Mathematics", "Science", "Language Arts", "Social Studies"]);
    }

    #[test]
    fn test_only_mathematics_has_videos() {
        let catalog = Catalog::builtin();
        assert!(catalog.has_videos(1));
        assert!(!catalog.has_videos(2));
        assert_eq!(catalog.recommended_subject().map(|s| s.id), Some(1));
        assert_eq!(catalog.lessons_for_subject(1).len(), 3);
        assert!(catalog.lessons_for_subject(3).is_empty());
    }

    #[test]
    fn test_video_difficulty_filter() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.videos(None).len(), 6);
        let ids: Vec<&str> = catalog
            .videos(Some(Difficulty::Intermediate))
            .iter()
            .map(|v| v.id.as_str())
            .collect();
        assert_eq!(ids, ["math-002", "math-003"]);
        assert_eq!(catalog.videos(Some(Difficulty::Advanced)).len(), 1);
    }

    #[test]
    fn test_video_details() {
        let catalog = Catalog::builtin();
        let details = catalog.video_details("math-001").unwrap();
        assert_eq!(details.title, "Introduction to Fractions");
        assert_eq!(details.category, "Mathematics");
        assert_eq!(details.difficulty, Difficulty::Beginner);
        assert_eq!(details.related_topics[0], "Decimals");
        assert!(catalog.video_details("math-999").is_none());
    }

    #[test]
    fn test_chat_context_names_subject() {
        let catalog = Catalog::builtin();
        let details = catalog.video_details("math-003").unwrap();
        assert_eq!(details.chat_context(), "Mathematics: Pythagorean Theorem");
    }

    #[test]
    fn test_events_sorted_by_real_time() {
        let catalog = Catalog::builtin();
        let tomorrow = today().succ_opt().unwrap();
        let titles: Vec<&str> = catalog
            .events_on(today(), tomorrow)
            .iter()
            .map(|e| e.title.as_str())
            .collect();
        // 10:00 before 15:00, not string order ("10:00 AM" vs "3:00 PM")
        assert_eq!(titles, ["Mathematics - Advanced Algebra", "Group Project Meeting"]);
    }

    #[test]
    fn test_event_days() {
        let catalog = Catalog::builtin();
        assert!(catalog.has_events(today(), today()));
        assert_eq!(catalog.events_on(today(), today())[0].kind, EventKind::Exam);
        let in_four_days = today().checked_add_days(Days::new(4)).unwrap();
        assert!(!catalog.has_events(today(), in_four_days));
        assert!(catalog.events_on(today(), in_four_days).is_empty());
    }

    #[test]
    fn test_progress_report() {
        let report = Catalog::builtin().progress().clone();
        assert_eq!(report.summary.overall_progress, 70);
        assert_eq!(report.subjects.len(), 4);
        assert_eq!(report.skills[0].name, "Problem Solving");
        assert_eq!(report.achievements.len(), 3);
    }

    #[tokio::test]
    async fn test_load_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let mut catalog = Catalog::builtin();
        catalog.subjects.truncate(2);
        std::fs::write(&path, serde_json::to_string(&catalog).unwrap()).unwrap();

        let loaded = Catalog::load_from_json(&path).await.unwrap();
        assert_eq!(loaded, catalog);
        assert!(Catalog::load_from_json(&dir.path().join("missing.json")).await.is_err());
    }
}
