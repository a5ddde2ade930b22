use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Datelike, Days, NaiveDate};
use ratatui::widgets::ListState;
use skillmorphix_core::catalog::{Catalog, Difficulty, Subject, Video, VideoDetails};
use skillmorphix_core::clock::Clock;
use skillmorphix_core::config::{Config, Preference};
use skillmorphix_core::conversation::Conversation;
use skillmorphix_core::profile::{Grade, Language, ProfileError, StudentProfile};

/// Ticks a notice stays on screen
pub const NOTICE_TICKS: u16 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Welcome,
    Dashboard,
    Videos,
    VideoPlayer,
    Schedule,
    Progress,
    Chat,
    Settings,
}

impl Screen {
    pub fn title(&self) -> &'static str {
        match self {
            Screen::Welcome => "Welcome",
            Screen::Dashboard => "Dashboard",
            Screen::Videos => "Mathematics Videos",
            Screen::VideoPlayer => "Video",
            Screen::Schedule => "Schedule",
            Screen::Progress => "Progress",
            Screen::Chat => "AI Assistant",
            Screen::Settings => "Settings",
        }
    }

    /// Screen bound to a number key
    pub fn from_shortcut(c: char) -> Option<Screen> {
        match c {
            '1' => Some(Screen::Dashboard),
            '2' => Some(Screen::Videos),
            '3' => Some(Screen::Schedule),
            '4' => Some(Screen::Progress),
            '5' => Some(Screen::Chat),
            '6' => Some(Screen::Settings),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressTab {
    #[default]
    Subjects,
    Skills,
    Achievements,
}

impl ProgressTab {
    pub const ALL: [ProgressTab; 3] = [ProgressTab::Subjects, ProgressTab::Skills, ProgressTab::Achievements];

    pub fn title(&self) -> &'static str {
        match self {
            ProgressTab::Subjects => "Subjects",
            ProgressTab::Skills => "Skills",
            ProgressTab::Achievements => "Achievements",
        }
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsItem {
    EditProfile,
    Toggle(Preference),
    SignOut,
}

impl SettingsItem {
    pub fn all() -> Vec<SettingsItem> {
        let mut items = vec![SettingsItem::EditProfile];
        items.extend(Preference::all().into_iter().map(SettingsItem::Toggle));
        items.push(SettingsItem::SignOut);
        items
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Single-line text input. `cursor` counts characters, not bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputLine {
    pub value: String,
    pub cursor: usize,
}

impl InputLine {
    pub fn with_value(value: &str) -> Self {
        Self {
            value: value.to_string(),
            cursor: value.chars().count(),
        }
    }

    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.value, self.cursor);
        self.value.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.value, self.cursor);
            self.value.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let byte_pos = char_to_byte_index(&self.value, self.cursor);
            self.value.remove(byte_pos);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.value.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Grade,
    Language,
}

/// Onboarding and profile-edit form
#[derive(Debug, Clone)]
pub struct ProfileForm {
    pub name: InputLine,
    pub grade: Grade,
    pub language: Language,
    pub field: FormField,
}

impl ProfileForm {
    pub fn from_profile(profile: Option<&StudentProfile>) -> Self {
        match profile {
            Some(p) => Self {
                name: InputLine::with_value(&p.name),
                grade: p.grade,
                language: p.language,
                field: FormField::Name,
            },
            None => Self {
                name: InputLine::default(),
                grade: Grade::default(),
                language: Language::default(),
                field: FormField::Name,
            },
        }
    }

    pub fn next_field(&mut self) {
        self.field = match self.field {
            FormField::Name => FormField::Grade,
            FormField::Grade => FormField::Language,
            FormField::Language => FormField::Name,
        };
    }

    pub fn prev_field(&mut self) {
        self.field = match self.field {
            FormField::Name => FormField::Language,
            FormField::Grade => FormField::Name,
            FormField::Language => FormField::Grade,
        };
    }

    /// Step the grade or language selector, wrapping at either end.
    /// Does nothing on the name field.
    pub fn step(&mut self, forward: bool) {
        match self.field {
            FormField::Name => {}
            FormField::Grade => {
                let value = self.grade.value();
                let stepped = if forward {
                    value % Grade::MAX + 1
                } else if value <= Grade::MIN {
                    Grade::MAX
                } else {
                    value - 1
                };
                if let Ok(grade) = Grade::new(stepped) {
                    self.grade = grade;
                }
            }
            FormField::Language => {
                let all = Language::all();
                let idx = all.iter().position(|l| *l == self.language).unwrap_or(0);
                let next = if forward {
                    (idx + 1) % all.len()
                } else {
                    (idx + all.len() - 1) % all.len()
                };
                self.language = all[next];
            }
        }
    }

    pub fn submit(&self) -> Result<StudentProfile, ProfileError> {
        StudentProfile::new(&self.name.value, self.grade, self.language)
    }
}

/// Transient message shown over the current screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub body: String,
    ttl: u16,
}

fn select_next(state: &mut ListState, len: usize) {
    if len > 0 {
        let i = state.selected().unwrap_or(0);
        state.select(Some((i + 1).min(len - 1)));
    }
}

fn select_prev(state: &mut ListState, len: usize) {
    if len > 0 {
        let i = state.selected().unwrap_or(0);
        state.select(Some(i.saturating_sub(1)));
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,

    // Data
    pub config: Config,
    config_path: PathBuf,
    pub catalog: Catalog,
    clock: Arc<dyn Clock>,
    pub today: NaiveDate,

    // Dashboard
    pub subject_state: ListState,

    // Videos
    pub video_filter: Option<Difficulty>,
    pub video_state: ListState,
    pub current_video: Option<String>,

    // Schedule and progress
    pub schedule_date: NaiveDate,
    pub progress_tab: ProgressTab,

    // Chat; the conversation only exists while the chat screen is open
    pub conversation: Option<Conversation>,
    pub chat_input: InputLine,
    pub chat_scroll: u16,
    pub chat_follow: bool,
    pub chat_height: u16,
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Onboarding and settings
    pub form: ProfileForm,
    pub settings_state: ListState,
    pub notice: Option<Notice>,
}

impl App {
    pub fn new(config: Config, config_path: PathBuf, catalog: Catalog, clock: Arc<dyn Clock>) -> Self {
        let today = clock.local_time().date_naive();
        let (screen, input_mode) = if config.profile.is_some() {
            (Screen::Dashboard, InputMode::Normal)
        } else {
            (Screen::Welcome, InputMode::Editing)
        };
        let form = ProfileForm::from_profile(config.profile.as_ref());

        Self {
            should_quit: false,
            screen,
            input_mode,

            config,
            config_path,
            catalog,
            clock,
            today,

            subject_state: ListState::default().with_selected(Some(0)),

            video_filter: None,
            video_state: ListState::default().with_selected(Some(0)),
            current_video: None,

            schedule_date: today,
            progress_tab: ProgressTab::default(),

            conversation: None,
            chat_input: InputLine::default(),
            chat_scroll: 0,
            chat_follow: true,
            chat_height: 0,
            animation_frame: 0,

            form,
            settings_state: ListState::default().with_selected(Some(0)),
            notice: None,
        }
    }

    pub fn profile(&self) -> Option<&StudentProfile> {
        self.config.profile.as_ref()
    }

    pub fn notify(&mut self, title: impl Into<String>, body: impl Into<String>) {
        let notice = Notice {
            title: title.into(),
            body: body.into(),
            ttl: NOTICE_TICKS,
        };
        tracing::debug!(title = %notice.title, "notice shown");
        self.notice = Some(notice);
    }

    /// Write the config, reporting failure as a notice. Returns whether it was saved.
    fn persist(&mut self) -> bool {
        match self.config.save_to(&self.config_path) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "failed to save config");
                self.notify("Save Failed", format!("{:#}", e));
                false
            }
        }
    }

    /// Leave the current screen for `screen`. Returns false when the move is refused.
    fn leave_for(&mut self, screen: Screen) -> bool {
        if self.screen == screen {
            return false;
        }
        // Everything past onboarding needs a profile
        if screen != Screen::Welcome && self.profile().is_none() {
            return false;
        }

        if self.screen == Screen::Chat && self.conversation.take().is_some() {
            tracing::info!("conversation closed");
        }

        tracing::info!(from = ?self.screen, to = ?screen, "screen change");
        self.screen = screen;
        self.input_mode = InputMode::Normal;
        true
    }

    pub fn switch_screen(&mut self, screen: Screen) {
        if screen == Screen::Chat {
            self.open_chat(None);
            return;
        }
        if !self.leave_for(screen) {
            return;
        }

        match screen {
            Screen::Welcome => {
                self.form = ProfileForm::from_profile(None);
                self.input_mode = InputMode::Editing;
            }
            Screen::Schedule => self.schedule_date = self.today,
            Screen::Settings => self.form = ProfileForm::from_profile(self.config.profile.as_ref()),
            _ => {}
        }
    }

    /// Open the chat screen with a fresh conversation
    pub fn open_chat(&mut self, context_hint: Option<&str>) {
        if !self.leave_for(Screen::Chat) {
            return;
        }
        self.conversation = Some(Conversation::new(
            context_hint,
            self.config.reply_delay(),
            self.clock.clone(),
        ));
        self.chat_input.clear();
        self.chat_scroll = 0;
        self.chat_follow = true;
        self.animation_frame = 0;
        self.input_mode = InputMode::Editing;
    }

    pub fn send_chat(&mut self) {
        let Some(conversation) = self.conversation.as_mut() else {
            return;
        };
        if conversation.send(&self.chat_input.value) {
            self.chat_input.clear();
            self.chat_follow = true;
        }
    }

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.chat_follow = false;
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    /// Rendering clamps the offset and resumes following at the bottom
    pub fn scroll_chat_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines);
    }

    pub fn on_tick(&mut self) {
        self.today = self.clock.local_time().date_naive();

        if let Some(notice) = self.notice.as_mut() {
            notice.ttl = notice.ttl.saturating_sub(1);
            if notice.ttl == 0 {
                self.notice = None;
            }
        }

        if let Some(conversation) = self.conversation.as_mut() {
            if conversation.poll() > 0 {
                self.chat_follow = true;
            }
            if conversation.is_awaiting_reply() {
                self.animation_frame = (self.animation_frame + 1) % 3;
            } else {
                self.animation_frame = 0;
            }
        }
    }

    // Onboarding and profile

    pub fn submit_profile(&mut self) {
        let profile = match self.form.submit() {
            Ok(profile) => profile,
            Err(e) => {
                self.notify("Missing Information", e.to_string());
                return;
            }
        };

        let onboarding = self.screen == Screen::Welcome;
        let name = profile.name.clone();
        tracing::info!(grade = profile.grade.value(), language = profile.language.as_str(), "profile saved");
        self.config.profile = Some(profile);
        self.input_mode = InputMode::Normal;
        let saved = self.persist();

        if onboarding {
            self.switch_screen(Screen::Dashboard);
            if saved {
                self.notify(
                    format!("Welcome {}!", name),
                    "Your personalized learning journey begins now.",
                );
            }
        } else if saved {
            self.notify("Profile Updated", "Your profile information has been saved");
        }
    }

    pub fn begin_edit_profile(&mut self) {
        self.form = ProfileForm::from_profile(self.config.profile.as_ref());
        self.input_mode = InputMode::Editing;
    }

    pub fn cancel_edit_profile(&mut self) {
        self.form = ProfileForm::from_profile(self.config.profile.as_ref());
        self.input_mode = InputMode::Normal;
    }

    pub fn toggle_preference(&mut self, pref: Preference) {
        let enabled = self.config.preferences.toggle(pref);
        tracing::info!(preference = pref.label(), enabled, "preference changed");
        if self.persist() {
            let (title, body) = pref.toggle_notice(enabled);
            self.notify(title, body);
        }
    }

    pub fn sign_out(&mut self) {
        self.config.sign_out();
        let saved = self.persist();
        self.switch_screen(Screen::Welcome);
        if saved {
            self.notify("Signed Out", "You have been successfully signed out");
        }
    }

    pub fn selected_settings_item(&self) -> Option<SettingsItem> {
        self.settings_state
            .selected()
            .and_then(|i| SettingsItem::all().get(i).copied())
    }

    pub fn activate_settings_item(&mut self) {
        match self.selected_settings_item() {
            Some(SettingsItem::EditProfile) => self.begin_edit_profile(),
            Some(SettingsItem::Toggle(pref)) => self.toggle_preference(pref),
            Some(SettingsItem::SignOut) => self.sign_out(),
            None => {}
        }
    }

    // Dashboard

    pub fn subjects(&self) -> &[Subject] {
        let grade = self.profile().map(|p| p.grade).unwrap_or_default();
        self.catalog.subjects_for_grade(grade)
    }

    pub fn selected_subject(&self) -> Option<&Subject> {
        self.subject_state.selected().and_then(|i| self.subjects().get(i))
    }

    pub fn activate_selected_subject(&mut self) {
        let Some(subject) = self.selected_subject().cloned() else {
            return;
        };

        if self.catalog.has_videos(subject.id) {
            self.video_filter = None;
            self.video_state.select(Some(0));
            self.switch_screen(Screen::Videos);
        } else {
            self.notify(
                format!("{} Coming Soon", subject.name),
                "Videos for this subject will be available soon!",
            );
        }
    }

    // Videos

    pub fn visible_videos(&self) -> Vec<&Video> {
        self.catalog.videos(self.video_filter)
    }

    pub fn selected_video(&self) -> Option<&Video> {
        self.video_state
            .selected()
            .and_then(|i| self.visible_videos().get(i).copied())
    }

    /// All -> beginner -> intermediate -> advanced -> all
    pub fn cycle_video_filter(&mut self) {
        self.video_filter = match self.video_filter {
            None => Some(Difficulty::Beginner),
            Some(Difficulty::Beginner) => Some(Difficulty::Intermediate),
            Some(Difficulty::Intermediate) => Some(Difficulty::Advanced),
            Some(Difficulty::Advanced) => None,
        };
        let first = if self.visible_videos().is_empty() { None } else { Some(0) };
        self.video_state.select(first);
    }

    pub fn open_selected_video(&mut self) {
        let Some(id) = self.selected_video().map(|v| v.id.clone()) else {
            return;
        };
        self.current_video = Some(id);
        self.switch_screen(Screen::VideoPlayer);
    }

    pub fn current_video_details(&self) -> Option<VideoDetails> {
        self.current_video
            .as_deref()
            .and_then(|id| self.catalog.video_details(id))
    }

    /// Open the chat with the playing video's subject and title as the context hint
    pub fn ask_about_current_video(&mut self) {
        let context = self.current_video_details().map(|d| d.chat_context());
        self.open_chat(context.as_deref());
    }

    // Schedule

    pub fn shift_schedule_day(&mut self, days: i64) {
        let shifted = if days >= 0 {
            self.schedule_date.checked_add_days(Days::new(days.unsigned_abs()))
        } else {
            self.schedule_date.checked_sub_days(Days::new(days.unsigned_abs()))
        };
        if let Some(date) = shifted {
            self.schedule_date = date;
        }
    }

    /// Monday through Sunday of the week holding the selected date
    pub fn schedule_week(&self) -> Vec<NaiveDate> {
        let back = Days::new(u64::from(self.schedule_date.weekday().num_days_from_monday()));
        let monday = self.schedule_date.checked_sub_days(back).unwrap_or(self.schedule_date);
        (0..7)
            .filter_map(|i| monday.checked_add_days(Days::new(i)))
            .collect()
    }

    // List navigation for the current screen
    pub fn nav_down(&mut self) {
        match self.screen {
            Screen::Dashboard => {
                let len = self.subjects().len();
                select_next(&mut self.subject_state, len);
            }
            Screen::Videos => {
                let len = self.visible_videos().len();
                select_next(&mut self.video_state, len);
            }
            Screen::Settings => select_next(&mut self.settings_state, SettingsItem::all().len()),
            Screen::Chat => self.scroll_chat_down(1),
            _ => {}
        }
    }

    pub fn nav_up(&mut self) {
        match self.screen {
            Screen::Dashboard => {
                let len = self.subjects().len();
                select_prev(&mut self.subject_state, len);
            }
            Screen::Videos => {
                let len = self.visible_videos().len();
                select_prev(&mut self.video_state, len);
            }
            Screen::Settings => select_prev(&mut self.settings_state, SettingsItem::all().len()),
            Screen::Chat => self.scroll_chat_up(1),
            _ => {}
        }
    }
}
