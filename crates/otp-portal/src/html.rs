//! HTML fragments returned by the form endpoints.

/// Escape text for inclusion in HTML element content or quoted attributes.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn registration_complete() -> String {
    "<h2>✅ Registration successful!</h2><a href='/login.html'>Login here</a>".into()
}

pub fn invalid_otp() -> String {
    "<h2>❌ Invalid OTP</h2><a href='/register.html'>Try Again</a>".into()
}

pub fn session_expired() -> String {
    "<h2>❌ Session expired. Please register again.</h2><a href='/register.html'>Register</a>"
        .into()
}

pub fn login_success(name: &str) -> String {
    format!(
        "<h2>✅ Login successful! Welcome {}</h2><a href='/index.html'>Go to Home</a>",
        escape(name)
    )
}

pub fn invalid_credentials() -> String {
    "<h2>❌ Invalid email or password</h2><a href='/login.html'>Try Again</a>".into()
}

pub fn contact_received() -> String {
    "<h2>✅ Details saved and email sent!</h2><a href='/index.html'>Go Back</a>".into()
}

pub fn error_page(message: &str) -> String {
    format!(
        "<h2>❌ {}</h2><a href='/index.html'>Go Back</a>",
        escape(message)
    )
}
