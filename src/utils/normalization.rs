//! Normalização de identificadores vindos do amoCRM
//!
//! O amoCRM envia o mesmo id ora como número, ora como string. Tudo que vira
//! chave de cache ou nome de arquivo passa por aqui.

use serde_json::Value;

/// Converte um id de status para a forma canônica em string
///
/// Retorna `None` para ids "falsos" (`null`, `0`, `""`, `false`), que o
/// amoCRM usa para indicar ausência de status.
///
/// # Exemplos
/// ```
/// use amocrm_telegram_relay::utils::normalization::normalize_status_id;
/// use serde_json::json;
///
/// assert_eq!(normalize_status_id(&json!(142)), Some("142".to_string()));
/// assert_eq!(normalize_status_id(&json!("142")), Some("142".to_string()));
/// assert_eq!(normalize_status_id(&json!(0)), None);
/// ```
pub fn normalize_status_id(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                (i != 0).then(|| i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                // Floats inteiros (142.0) colidem com o inteiro correspondente
                let f = n.as_f64()?;
                if f == 0.0 {
                    None
                } else if f.fract() == 0.0 && f.abs() < 9.0e15 {
                    Some((f as i64).to_string())
                } else {
                    Some(f.to_string())
                }
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// Transforma o id da conta em um trecho seguro para nome de arquivo
///
/// `[A-Za-z0-9-]` passa direto; qualquer outro byte (inclusive `_`) vira
/// `_XX` em hex maiúsculo. A codificação é injetiva: contas diferentes nunca
/// dividem o mesmo arquivo, e o scope nunca escapa do diretório de dados.
///
/// # Exemplos
/// ```
/// use amocrm_telegram_relay::utils::normalization::encode_scope_id;
///
/// assert_eq!(encode_scope_id("31415926"), "31415926");
/// assert_eq!(encode_scope_id("a_b"), "a_5Fb");
/// assert_eq!(encode_scope_id("../etc"), "_2E_2E_2Fetc");
/// ```
pub fn encode_scope_id(scope_id: &str) -> String {
    let mut encoded = String::with_capacity(scope_id.len());

    for byte in scope_id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("_{:02X}", byte));
        }
    }

    encoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_and_string_ids_collide() {
        assert_eq!(normalize_status_id(&json!(142)), normalize_status_id(&json!("142")));
        assert_eq!(normalize_status_id(&json!(142.0)), Some("142".to_string()));
        assert_eq!(normalize_status_id(&json!(" 142 ")), Some("142".to_string()));
    }

    #[test]
    fn test_falsy_ids_are_absent() {
        assert_eq!(normalize_status_id(&json!(null)), None);
        assert_eq!(normalize_status_id(&json!(0)), None);
        assert_eq!(normalize_status_id(&json!("")), None);
        assert_eq!(normalize_status_id(&json!(false)), None);
        assert_eq!(normalize_status_id(&json!([142])), None);
    }

    #[test]
    fn test_encode_scope_id() {
        assert_eq!(encode_scope_id("abc-123X"), "abc-123X");
        assert_eq!(encode_scope_id("a/b"), "a_2Fb");
        assert_eq!(encode_scope_id("a_b"), "a_5Fb");
        assert_eq!(encode_scope_id("a b"), "a_20b");
        assert_eq!(encode_scope_id("ж"), "_D0_B6");
        assert_eq!(encode_scope_id(""), "");
    }

    #[test]
    fn test_encoded_scope_ids_do_not_collide() {
        let scopes = ["a/b", "a_b", "a.b", "a b", "a_2Fb", "a__b"];
        let encoded: std::collections::HashSet<String> =
            scopes.iter().map(|scope| encode_scope_id(scope)).collect();

        assert_eq!(encoded.len(), scopes.len());
    }
}
