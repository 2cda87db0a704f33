/// Unit labels used when rendering a wait estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeLabels {
    /// Rendered when the wait is already over.
    pub now: &'static str,
    pub hour: &'static str,
    pub hours: &'static str,
    pub minute: &'static str,
    pub minutes: &'static str,
}

impl TimeLabels {
    pub const ENGLISH: Self = Self {
        now: "now",
        hour: "hour",
        hours: "hours",
        minute: "minute",
        minutes: "minutes",
    };

    pub const INDONESIAN: Self = Self {
        now: "sekarang",
        hour: "jam",
        hours: "jam",
        minute: "menit",
        minutes: "menit",
    };

    fn hour_label(&self, count: i64) -> &'static str {
        if count == 1 { self.hour } else { self.hours }
    }

    fn minute_label(&self, count: i64) -> &'static str {
        if count == 1 { self.minute } else { self.minutes }
    }
}

impl Default for TimeLabels {
    fn default() -> Self {
        Self::ENGLISH
    }
}

/// Render a number of seconds as whole hours and minutes.
///
/// The hour component is omitted when it is zero. Non-positive input renders
/// the `now` label.
pub fn format_wait(remaining_secs: i64, labels: &TimeLabels) -> String {
    if remaining_secs <= 0 {
        return labels.now.to_string();
    }

    let hours = remaining_secs / 3600;
    let minutes = (remaining_secs % 3600) / 60;
    let minute_part = format!("{minutes} {}", labels.minute_label(minutes));

    if hours > 0 {
        format!("{hours} {} {minute_part}", labels.hour_label(hours))
    } else {
        minute_part
    }
}
