//! # Headers de la Respuesta
//! src/http/headers.rs
//!
//! Mapa de headers que tolera nombres repetidos (`Set-Cookie` varias veces).
//!
//! Los nombres se normalizan para búsqueda: `content-type`, `Content_Type` y
//! `CONTENT-TYPE` son la misma clave (`CONTENT_TYPE`). Cada nombre guarda
//! siempre una lista no vacía de valores, en el orden en que llegaron.

/// Normaliza un nombre de header: trim, mayúsculas y `-` → `_`
pub fn normalize_name(name: &str) -> String {
    name.trim().to_ascii_uppercase().replace('-', "_")
}

/// Invierte la normalización para mostrar: `CONTENT_TYPE` → `Content-Type`
pub fn display_name(normalized: &str) -> String {
    normalized
        .split('_')
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => {
                    first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Headers indexados por nombre normalizado, en orden de primera aparición
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, Vec<String>)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Agrega un valor; un nombre repetido se acumula en su lista
    pub fn append(&mut self, name: &str, value: &str) {
        let key = normalize_name(name);
        let value = value.trim().to_string();

        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// Continúa (folding) el último valor del último header agregado
    ///
    /// Retorna `false` si todavía no hay headers.
    pub(crate) fn fold_into_last(&mut self, continuation: &str) -> bool {
        let Some((_, values)) = self.entries.last_mut() else {
            return false;
        };
        if let Some(last) = values.last_mut() {
            let continuation = continuation.trim();
            if !continuation.is_empty() {
                if !last.is_empty() {
                    last.push(' ');
                }
                last.push_str(continuation);
            }
        }
        true
    }

    /// Todos los valores de un header (`None` si no existe)
    pub fn get_all(&self, name: &str) -> Option<&[String]> {
        let key = normalize_name(name);
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, values)| values.as_slice())
    }

    /// Primer valor de un header
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name)
            .and_then(|values| values.first())
            .map(|s| s.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get_all(name).is_some()
    }

    /// Cantidad de nombres distintos
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Itera `(nombre normalizado, valores)`
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Bloque completo `Name: value\r\n`, una línea por valor
    pub fn to_header_block(&self) -> String {
        let mut block = String::new();
        for (name, values) in &self.entries {
            let display = display_name(name);
            for value in values {
                block.push_str(&display);
                block.push_str(": ");
                block.push_str(value);
                block.push_str("\r\n");
            }
        }
        block
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name(" content-type "), "CONTENT_TYPE");
        assert_eq!(normalize_name("Content_Type"), "CONTENT_TYPE");
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("CONTENT_TYPE"), "Content-Type");
        assert_eq!(display_name("SET_COOKIE"), "Set-Cookie");
        assert_eq!(display_name("ETAG"), "Etag");
    }

    #[test]
    fn test_lookup_is_case_and_separator_insensitive() {
        let mut headers = Headers::new();
        headers.append("Content-Type", "text/html");

        assert_eq!(headers.get("content-type"), Some("text/html"));
        assert_eq!(headers.get("CONTENT_TYPE"), Some("text/html"));
        assert_eq!(headers.get("missing"), None);
    }

    #[test]
    fn test_repeated_header_keeps_order() {
        let mut headers = Headers::new();
        headers.append("Set-Cookie", "a=1; Path=/");
        headers.append("X-Other", "y");
        headers.append("set-cookie", "b=2");

        assert_eq!(headers.len(), 2);
        assert_eq!(
            headers.get_all("Set-Cookie"),
            Some(&["a=1; Path=/".to_string(), "b=2".to_string()][..])
        );
        assert_eq!(headers.get("Set-Cookie"), Some("a=1; Path=/"));
    }

    #[test]
    fn test_fold_into_last() {
        let mut headers = Headers::new();
        assert!(!headers.fold_into_last("orphan"));

        headers.append("X-Long", "first");
        assert!(headers.fold_into_last("   second"));
        assert_eq!(headers.get("X-Long"), Some("first second"));
    }

    #[test]
    fn test_header_block() {
        let mut headers = Headers::new();
        headers.append("content-type", "text/plain");
        headers.append("Set-Cookie", "a=1");
        headers.append("Set-Cookie", "b=2");

        assert_eq!(
            headers.to_header_block(),
            "Content-Type: text/plain\r\nSet-Cookie: a=1\r\nSet-Cookie: b=2\r\n"
        );
    }
}
