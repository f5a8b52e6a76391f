/// Utilitários de texto usados na montagem das mensagens do Telegram

use serde_json::Value;

/// Trunca uma string de forma segura, garantindo que o índice não corte no meio de um caractere UTF-8
///
/// # Exemplo
/// ```
/// use amocrm_telegram_relay::utils::string_utils::truncate_safe;
///
/// assert_eq!(truncate_safe("Сделка", 4), "Сд");
/// ```
pub fn truncate_safe(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }

    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }

    &s[..end]
}

/// Trunca uma string e adiciona um sufixo (como "…") se houve corte
pub fn truncate_with_suffix(s: &str, max_bytes: usize, suffix: &str) -> String {
    let truncated = truncate_safe(s, max_bytes);
    if truncated.len() < s.len() {
        format!("{}{}", truncated, suffix)
    } else {
        truncated.to_string()
    }
}

/// Escapa os caracteres reservados do `parse_mode=HTML` do Telegram
///
/// # Exemplo
/// ```
/// use amocrm_telegram_relay::utils::string_utils::escape_html;
///
/// assert_eq!(escape_html("ООО <Ромашка> & Co"), "ООО &lt;Ромашка&gt; &amp; Co");
/// ```
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Converte um valor JSON escalar em texto para exibição
///
/// Strings saem sem aspas, números como vieram, `null` vira string vazia.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Semântica de "verdadeiro" usada pelos payloads do amoCRM
///
/// `false`, `null`, `0`, `""`, `"0"`, listas e objetos vazios são falsos.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truncate_safe_cyrillic() {
        // Cada letra cirílica ocupa 2 bytes
        assert_eq!(truncate_safe("Сделка", 5), "Сд");
        assert_eq!(truncate_safe("Сделка", 100), "Сделка");
    }

    #[test]
    fn test_truncate_with_suffix() {
        let result = truncate_with_suffix("This is a very long text", 10, "…");
        assert_eq!(result, "This is a …");
        assert_eq!(truncate_with_suffix("curto", 10, "…"), "curto");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
        assert_eq!(escape_html("Без названия"), "Без названия");
    }

    #[test]
    fn test_value_to_text() {
        assert_eq!(value_to_text(&json!("Deal1")), "Deal1");
        assert_eq!(value_to_text(&json!(15000)), "15000");
        assert_eq!(value_to_text(&json!(99.5)), "99.5");
        assert_eq!(value_to_text(&Value::Null), "");
    }

    #[test]
    fn test_is_truthy() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("1")));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("0")));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&Value::Null));
    }
}
