//! Static portal content: banner, quick actions, health tips.

pub const PORTAL_NAME: &str = "MedRecord Hub";
pub const BANNER_TITLE: &str = "Welcome to Patient Portal";
pub const BANNER_SUBTITLE: &str = "Track your X-ray scans and medical records in one place";
pub const LOOKUP_TITLE: &str = "Track Your X-Ray Analysis";
pub const LOOKUP_PLACEHOLDER: &str = "Enter reference number provided by your doctor";
pub const LOOKUP_HINT: &str =
    "Enter the reference number provided by your doctor to view your X-ray analysis results";

/// A shortcut card on the portal home.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickAction {
    pub title: &'static str,
    pub description: &'static str,
}

/// A health education card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthTip {
    pub title: &'static str,
    pub summary: &'static str,
}

pub const QUICK_ACTIONS: [QuickAction; 3] = [
    QuickAction {
        title: "Schedule Appointment",
        description: "Book a new consultation with your doctor",
    },
    QuickAction {
        title: "Medical Records",
        description: "View your complete medical history",
    },
    QuickAction {
        title: "Contact Support",
        description: "Get help with any questions or concerns",
    },
];

pub const HEALTH_TIPS: [HealthTip; 2] = [
    HealthTip {
        title: "Understanding Your X-Ray Results",
        summary: "Learn how to interpret common X-ray findings and what they might mean for your health.",
    },
    HealthTip {
        title: "Preventive Care Guide",
        summary: "Discover tips and best practices for maintaining good respiratory health.",
    },
];
