//! 회원가입 / 로그인 폼 검증

use serde::{Deserialize, Serialize};

use crate::finance::{format_cpf, format_phone, is_valid_cpf, is_valid_email, is_valid_phone};
use crate::forms::errors::FieldErrors;

const MIN_USERNAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 8;

/// 회원가입 폼
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub username: String,
    pub phone: String,
    pub cpf: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub accept_terms: bool,
    /// 추천인 username (`?ref=`)
    #[serde(default, rename = "ref", alias = "referrer")]
    pub referrer: Option<String>,
}

/// 검증을 통과한 가입 요청 (전화번호와 CPF 는 표시 형식으로 정리됨)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub username: String,
    pub phone: String,
    pub cpf: String,
    pub password: String,
    pub referrer: Option<String>,
}

/// 로그인 폼
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// 회원가입 폼 검증 (모든 필드를 한 번에 검사)
pub fn validate_registration(form: &RegistrationForm) -> Result<Registration, FieldErrors> {
    let mut errors = FieldErrors::new();

    if form.name.trim().is_empty() {
        errors.insert("name", "Nome é obrigatório");
    }
    if !is_valid_email(&form.email) {
        errors.insert("email", "Email inválido");
    }
    if form.username.chars().count() < MIN_USERNAME_LEN {
        errors.insert("username", "Username deve ter pelo menos 3 caracteres");
    }
    if !is_valid_phone(&form.phone) {
        errors.insert("phone", "Telefone inválido");
    }
    if !is_valid_cpf(&form.cpf) {
        errors.insert("cpf", "CPF inválido");
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        errors.insert("password", "Senha deve ter pelo menos 8 caracteres");
    }
    if form.password != form.confirm_password {
        errors.insert("confirmPassword", "Senhas não coincidem");
    }
    if !form.accept_terms {
        errors.insert("acceptTerms", "Você deve aceitar os termos");
    }

    errors.into_result(Registration {
        name: form.name.trim().to_string(),
        email: form.email.trim().to_string(),
        username: form.username.clone(),
        phone: format_phone(&form.phone),
        cpf: format_cpf(&form.cpf),
        password: form.password.clone(),
        referrer: form.referrer.clone().filter(|r| !r.trim().is_empty()),
    })
}

/// 로그인 폼 검증
pub fn validate_login(form: &LoginForm) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if !is_valid_email(&form.email) {
        errors.insert("email", "Email inválido");
    }
    if form.password.is_empty() {
        errors.insert("password", "Senha é obrigatória");
    }

    errors.into_result(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> RegistrationForm {
        RegistrationForm {
            name: "Paul Stephen".to_string(),
            email: "skiddylnx@gmail.com".to_string(),
            username: "bybitearnusdt-web".to_string(),
            phone: "11987654321".to_string(),
            cpf: "12345678909".to_string(),
            password: "segredo123".to_string(),
            confirm_password: "segredo123".to_string(),
            accept_terms: true,
            referrer: Some("amigo".to_string()),
        }
    }

    #[test]
    fn test_valid_registration_is_normalized() {
        let registration = validate_registration(&valid_form()).unwrap();
        assert_eq!(registration.phone, "(11) 98765-4321");
        assert_eq!(registration.cpf, "123.456.789-09");
        assert_eq!(registration.referrer.as_deref(), Some("amigo"));
    }

    #[test]
    fn test_every_field_is_checked() {
        let errors = validate_registration(&RegistrationForm::default()).unwrap_err();
        for field in ["name", "email", "username", "phone", "cpf", "password", "acceptTerms"] {
            assert!(errors.contains(field), "missing error for {}", field);
        }
        // 둘 다 빈 문자열이면 일치함
        assert!(!errors.contains("confirmPassword"));
    }

    #[test]
    fn test_password_mismatch_and_weak_cpf() {
        let mut form = valid_form();
        form.confirm_password = "outra-senha".to_string();
        form.cpf = "111.111.111-11".to_string();

        let errors = validate_registration(&form).unwrap_err();
        assert_eq!(errors.get("confirmPassword"), Some("Senhas não coincidem"));
        assert_eq!(errors.get("cpf"), Some("CPF inválido"));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_form_field_names() {
        let json = r#"{
            "name": "Ana", "email": "ana@example.com", "username": "ana",
            "phone": "1133334444", "cpf": "98765432100",
            "password": "12345678", "confirmPassword": "12345678",
            "acceptTerms": true, "ref": "paul"
        }"#;
        let form: RegistrationForm = serde_json::from_str(json).unwrap();
        assert!(form.accept_terms);
        assert_eq!(form.referrer.as_deref(), Some("paul"));
        assert!(validate_registration(&form).is_ok());
    }

    #[test]
    fn test_login() {
        assert!(validate_login(&LoginForm {
            email: "skiddylnx@gmail.com".to_string(),
            password: "x".to_string(),
        })
        .is_ok());

        let errors = validate_login(&LoginForm::default()).unwrap_err();
        assert!(errors.contains("email"));
        assert!(errors.contains("password"));
    }
}
