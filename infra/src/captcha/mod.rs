//! CAPTCHA verification

mod recaptcha;

pub use recaptcha::RecaptchaVerifier;
