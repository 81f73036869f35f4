//! 추천 링크 / 고객지원 딥링크 생성

use url::form_urlencoded;
use url::Url;

use crate::config::FALLBACK_ORIGIN;
use crate::finance::validation::digits_only;

/// 고객지원 기본 메시지
pub const SUPPORT_GREETING: &str = "Olá! Preciso de ajuda com a plataforma BITFUSE.";

const REGISTER_PATH: &str = "/auth/register";
const WHATSAPP_BASE: &str = "https://wa.me/";

/// 추천 가입 링크
///
/// `origin` 이 없거나 올바른 URL 이 아니면 대체 주소를 사용합니다.
pub fn generate_referral_link(origin: Option<&str>, username: &str) -> String {
    let base = origin
        .and_then(|raw| Url::parse(raw).ok())
        .map(|url| url.origin().ascii_serialization())
        .filter(|serialized| serialized != "null")
        .unwrap_or_else(|| FALLBACK_ORIGIN.to_string());

    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("ref", username)
        .finish();

    format!("{}{}?{}", base, REGISTER_PATH, query)
}

/// WhatsApp 메시지 작성 링크
pub fn support_link(support_phone: &str, message: &str) -> String {
    let text: String = form_urlencoded::byte_serialize(message.as_bytes()).collect();
    format!("{}{}?text={}", WHATSAPP_BASE, digits_only(support_phone), text)
}
