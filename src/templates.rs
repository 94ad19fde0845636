//! Entry templates: a built-in library plus user templates from the store.
//!
//! Template bodies may contain `{{variable}}` placeholders that
//! [`fill_variables`] expands relative to a given instant.

use chrono::{DateTime, Datelike, Duration, FixedOffset, Months};
use serde::Serialize;

use crate::store::TemplateRecord;

/// Library categories with their icons, in display order.
pub const CATEGORIES: [(&str, &str); 5] = [
    ("Work", "💼"),
    ("Development", "💻"),
    ("Personal", "🏠"),
    ("Creative", "🎨"),
    ("Quick", "⚡"),
];

/// A template ready to fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Template {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Library category.
    pub category: String,
    /// Body with placeholders.
    pub content: String,
    /// One-line description.
    pub description: String,
    /// Shipped with pulse rather than user-defined.
    pub builtin: bool,
}

impl From<TemplateRecord> for Template {
    fn from(record: TemplateRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            category: record.category,
            content: record.content,
            description: record.description,
            builtin: false,
        }
    }
}

// (id, name, category, description, content)
const BUILTIN: &[(&str, &str, &str, &str, &str)] = &[
    (
        "meeting_notes",
        "Meeting Notes",
        "Work",
        "Structured meeting notes with agenda and action items",
        "📅 **Meeting:** {{date}}\n👥 **Attendees:** \n⏰ **Duration:** \n\n📋 **Agenda:**\n- \n\n💡 **Key Points:**\n- \n\n✅ **Action Items:**\n- [ ] \n\n🎯 **Decisions:**\n- ",
    ),
    (
        "daily_standup",
        "Daily Standup",
        "Work",
        "Daily standup notes for agile teams",
        "🌅 **Daily Standup - {{date}}**\n\n**Yesterday:**\n- \n\n**Today:**\n- \n\n**Blockers:**\n- \n\n**Goals for today:**\n- [ ] ",
    ),
    (
        "1on1_meeting",
        "1-on-1 Meeting",
        "Work",
        "Structured 1-on-1 meeting template",
        "🤝 **1-on-1 Meeting - {{date}}**\n\n**Previous Action Items:**\n- [ ] \n\n**Discussion Points:**\n- \n\n**Feedback:**\n- Positive: \n- Areas for improvement: \n\n**New Action Items:**\n- [ ] \n\n**Follow-up:** {{next_week_date}}",
    ),
    (
        "performance_review",
        "Performance Review",
        "Work",
        "Comprehensive performance review template",
        "📊 **Performance Review - {{period}}**\n\n**Achievements:**\n- \n\n**Areas of Excellence:**\n- \n\n**Development Areas:**\n- \n\n**Goals for Next Period:**\n- [ ] \n\n**Feedback & Comments:**\n- ",
    ),
    (
        "bug_report",
        "Bug Report",
        "Development",
        "Detailed bug report template",
        "🐛 **Bug Report**\n\n**Title:** \n\n**Environment:**\n- OS: \n- Version: \n\n**Steps to Reproduce:**\n1. \n2. \n3. \n\n**Expected Behavior:**\n- \n\n**Actual Behavior:**\n- ",
    ),
    (
        "code_review",
        "Code Review",
        "Development",
        "Structured code review template",
        "🔍 **Code Review**\n\n**Summary:**\n- \n\n**General Comments:**\n- ✅ Strengths: \n- 💡 Suggestions: \n\n**Specific Issues:**\n- \n\n**Approval:**\n- [ ] Approve\n- [ ] Request changes",
    ),
    (
        "deployment_checklist",
        "Deployment Checklist",
        "Development",
        "Complete deployment checklist",
        "🚀 **Deployment Checklist - {{date}}**\n\n**Pre-deployment:**\n- [ ] Code reviewed and approved\n- [ ] Tests passing\n- [ ] Documentation updated\n- [ ] Backup performed\n\n**Deployment:**\n- [ ] Deploy to staging\n- [ ] Smoke tests\n- [ ] Deploy to production\n\n**Post-deployment:**\n- [ ] Health checks passed\n- [ ] Team notified",
    ),
    (
        "daily_journal",
        "Daily Journal",
        "Personal",
        "Daily journaling template",
        "📖 **Daily Journal - {{date}}**\n\n**Today's Highlights:**\n- 😊 \n\n**Achievements:**\n- ✅ \n\n**Challenges:**\n- \n\n**What I Learned:**\n- \n\n**Tomorrow's Focus:**\n- ",
    ),
    (
        "goal_setting",
        "Goal Setting",
        "Personal",
        "SMART goal setting template",
        "🎯 **Goal Setting - {{timeframe}}**\n\n**Specific:**\n- \n\n**Measurable:**\n- \n\n**Achievable:**\n- \n\n**Relevant:**\n- \n\n**Time-bound:**\n- Target: {{deadline}}\n\n**Action Steps:**\n1. \n2. \n3. ",
    ),
    (
        "habit_tracker",
        "Habit Tracker",
        "Personal",
        "Weekly habit tracking template",
        "📊 **Habit Tracker - Week of {{week_date}}**\n\n| Habit | Mon | Tue | Wed | Thu | Fri | Sat | Sun |\n|-------|-----|-----|-----|-----|-----|-----|-----|\n| 🏃 Exercise | ☐ | ☐ | ☐ | ☐ | ☐ | ☐ | ☐ |\n| 📚 Reading | ☐ | ☐ | ☐ | ☐ | ☐ | ☐ | ☐ |\n\n**Reflection:**\n- ",
    ),
    (
        "brainstorming",
        "Brainstorming",
        "Creative",
        "Creative brainstorming template",
        "💡 **Brainstorming Session**\n\n**Topic:** \n\n**Initial Ideas (No Filter):**\n- \n- \n- \n\n**Top 3 Ideas:**\n1. \n2. \n3. \n\n**Next Steps:**\n- ",
    ),
    (
        "story_outline",
        "Story Outline",
        "Creative",
        "Story structure template",
        "📚 **Story Outline**\n\n**Title:** \n\n**Characters:**\n- Protagonist: \n- Antagonist: \n\n**Act 1: Setup**\n- \n\n**Act 2: Confrontation**\n- \n\n**Act 3: Resolution**\n- ",
    ),
    (
        "quick_note",
        "Quick Note",
        "Quick",
        "Simple quick note template",
        "📝 **Quick Note - {{date}} {{time}}**\n\n",
    ),
    (
        "task_list",
        "Task List",
        "Quick",
        "Quick task list template",
        "✅ **Task List - {{date}}**\n\n**High Priority:**\n- [ ] \n\n**Medium Priority:**\n- [ ] \n\n**Low Priority:**\n- [ ] ",
    ),
    (
        "decision_making",
        "Quick Decision",
        "Quick",
        "Quick decision-making template",
        "⚖️ **Quick Decision**\n\n**Decision:** \n\n✅ **Pros:**\n- \n\n❌ **Cons:**\n- \n\n**Rationale:** ",
    ),
];

/// The built-in templates.
pub fn builtin() -> Vec<Template> {
    BUILTIN
        .iter()
        .map(|(id, name, category, description, content)| Template {
            id: (*id).to_string(),
            name: (*name).to_string(),
            category: (*category).to_string(),
            content: (*content).to_string(),
            description: (*description).to_string(),
            builtin: true,
        })
        .collect()
}

/// Built-in and user templates together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Library {
    templates: Vec<Template>,
}

impl Library {
    /// Built-ins followed by `user` templates. User templates whose id
    /// collides with a built-in are skipped.
    pub fn new(user: Vec<TemplateRecord>) -> Self {
        let mut templates = builtin();
        for record in user {
            if !templates.iter().any(|t| t.id == record.id) {
                templates.push(record.into());
            }
        }
        Self { templates }
    }

    /// Category names: the fixed five, then any extra user categories.
    pub fn categories(&self) -> Vec<String> {
        let mut names: Vec<String> = CATEGORIES.iter().map(|(n, _)| (*n).to_string()).collect();
        for template in &self.templates {
            if !names.iter().any(|n| n.eq_ignore_ascii_case(&template.category)) {
                names.push(template.category.clone());
            }
        }
        names
    }

    /// Templates in `category` whose name or description contains `query`.
    pub fn matching(&self, category: &str, query: &str) -> Vec<&Template> {
        let query = query.trim().to_lowercase();
        self.templates
            .iter()
            .filter(|t| t.category.eq_ignore_ascii_case(category))
            .filter(|t| {
                query.is_empty()
                    || t.name.to_lowercase().contains(&query)
                    || t.description.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Every template.
    pub fn all(&self) -> &[Template] {
        &self.templates
    }
}

/// Icon for a library category; user categories get a generic one.
pub fn category_icon(category: &str) -> &'static str {
    CATEGORIES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(category))
        .map_or("📁", |(_, icon)| icon)
}

/// Expand the known placeholders relative to `now`.
pub fn fill_variables(content: &str, now: DateTime<FixedOffset>) -> String {
    let date = now.format("%Y-%m-%d").to_string();
    let next_week = (now + Duration::days(7)).format("%Y-%m-%d").to_string();
    let deadline = now
        .checked_add_months(Months::new(1))
        .unwrap_or(now)
        .format("%Y-%m-%d")
        .to_string();
    let replacements = [
        ("{{date}}", date.clone()),
        ("{{time}}", now.format("%H:%M").to_string()),
        ("{{datetime}}", now.format("%Y-%m-%d %H:%M").to_string()),
        ("{{week_date}}", format!("{date}-{next_week}")),
        ("{{next_week_date}}", next_week.clone()),
        ("{{deadline}}", deadline),
        ("{{period}}", now.format("%B %Y").to_string()),
        ("{{timeframe}}", format!("Q{}", (now.month() - 1) / 3 + 1)),
    ];
    replacements
        .iter()
        .fold(content.to_string(), |acc, (placeholder, value)| {
            acc.replace(placeholder, value)
        })
}
