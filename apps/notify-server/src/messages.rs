//! User-facing response text, per locale.

use notif_core::domain::{Locale, TimeLabels};

/// Message catalog for one locale.
#[derive(Debug, Clone, Copy)]
pub struct Messages {
    locale: Locale,
    expose_transport_errors: bool,
}

impl Messages {
    pub fn new(locale: Locale, expose_transport_errors: bool) -> Self {
        Self {
            locale,
            expose_transport_errors,
        }
    }

    pub fn time_labels(&self) -> TimeLabels {
        self.locale.time_labels()
    }

    pub fn sent(&self) -> &'static str {
        match self.locale {
            Locale::English => "Notification sent successfully!",
            Locale::Indonesian => "Notifikasi berhasil dikirim!",
        }
    }

    pub fn method_not_allowed(&self) -> &'static str {
        match self.locale {
            Locale::English => "Method not allowed. Use POST.",
            Locale::Indonesian => "Method tidak diizinkan. Gunakan POST.",
        }
    }

    pub fn missing_email(&self) -> &'static str {
        match self.locale {
            Locale::English => "Email must not be empty.",
            Locale::Indonesian => "Email tidak boleh kosong.",
        }
    }

    pub fn invalid_email(&self) -> &'static str {
        match self.locale {
            Locale::English => "Invalid email format.",
            Locale::Indonesian => "Format email tidak valid.",
        }
    }

    pub fn malformed_body(&self) -> &'static str {
        match self.locale {
            Locale::English => "Malformed request body.",
            Locale::Indonesian => "Format permintaan tidak valid.",
        }
    }

    pub fn configuration(&self, detail: &str) -> String {
        match self.locale {
            Locale::English => format!(
                "SMTP configuration is incomplete. Make sure the username and password are set ({detail})."
            ),
            Locale::Indonesian => format!(
                "Konfigurasi SMTP tidak lengkap. Pastikan username dan password sudah diisi ({detail})."
            ),
        }
    }

    pub fn rate_limited(&self, wait: &str) -> String {
        match self.locale {
            Locale::English => format!(
                "You have reached the email sending limit. Please try again in {wait}."
            ),
            Locale::Indonesian => format!(
                "Anda sudah mencapai batas pengiriman email. Silakan coba lagi dalam {wait}."
            ),
        }
    }

    /// Relay detail is only included when transport errors are exposed.
    pub fn dispatch_failed(&self, detail: &str) -> String {
        let base = match self.locale {
            Locale::English => "Failed to send email.",
            Locale::Indonesian => "Gagal mengirim email.",
        };
        if self.expose_transport_errors {
            format!("{base} Error: {detail}")
        } else {
            base.to_string()
        }
    }

    pub fn internal(&self) -> &'static str {
        match self.locale {
            Locale::English => "An unexpected error occurred. Please try again.",
            Locale::Indonesian => "Terjadi kesalahan. Silakan coba lagi.",
        }
    }

    pub fn not_found(&self) -> &'static str {
        match self.locale {
            Locale::English => "Endpoint not found.",
            Locale::Indonesian => "Endpoint tidak ditemukan.",
        }
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self::new(Locale::default(), true)
    }
}
