//! # Configuração
//!
//! [`ConllConfig`] é a forma serializável (TOML) das opções de escrita. Todos
//! os campos têm padrão, então um arquivo vazio é uma configuração válida:
//!
//! ```toml
//! encoding = "UTF-8"
//! filename_suffix = ".conll"
//! write_named_entity = true
//! extra_layers = ["chunk"]
//! layout = "indexed"
//! placeholder = "_"
//! missing_attribute = "fallback"
//! absent_layer = "outside"
//! parallel = false
//! ```
//!
//! [`ConllConfig::resolve`] valida os valores e produz o [`WriterConfig`]
//! usado pelo escritor. Erros de configuração aparecem aqui, antes de qualquer
//! documento ser tocado.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::document::Layer;
use crate::error::{ConllError, Result};
use crate::row::MissingAttributePolicy;
use crate::writer::{AbsentLayerPolicy, Column, Layout, WriterConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConllConfig {
    /// Rótulo da codificação de saída (qualquer rótulo WHATWG: "utf-8", "latin1"...).
    pub encoding: String,
    pub filename_suffix: String,
    /// Inclui a coluna de entidades nomeadas.
    pub write_named_entity: bool,
    /// Camadas escritas depois das entidades, na ordem dada.
    pub extra_layers: Vec<Layer>,
    pub layout: Layout,
    /// Lista explícita de colunas; substitui `layout`, `write_named_entity` e `extra_layers`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<Column>>,
    pub placeholder: String,
    pub missing_attribute: MissingAttributePolicy,
    pub absent_layer: AbsentLayerPolicy,
    /// Converte documentos em paralelo.
    pub parallel: bool,
}

impl Default for ConllConfig {
    fn default() -> Self {
        Self {
            encoding: "UTF-8".to_string(),
            filename_suffix: ".conll".to_string(),
            write_named_entity: true,
            extra_layers: Vec::new(),
            layout: Layout::default(),
            columns: None,
            placeholder: "_".to_string(),
            missing_attribute: MissingAttributePolicy::default(),
            absent_layer: AbsentLayerPolicy::default(),
            parallel: false,
        }
    }
}

impl ConllConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| ConllError::Config(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConllError::io(path.display().to_string(), e))?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ConllError::Config(e.to_string()))
    }

    /// Colunas efetivas: a lista explícita ou layout + camadas habilitadas.
    pub fn effective_columns(&self) -> Vec<Column> {
        if let Some(columns) = &self.columns {
            return columns.clone();
        }
        let mut columns = self.layout.base_columns();
        if self.write_named_entity {
            columns.push(Column::Layer(Layer::NamedEntity));
        }
        columns.extend(
            self.extra_layers
                .iter()
                .filter(|layer| **layer != Layer::NamedEntity)
                .cloned()
                .map(Column::Layer),
        );
        columns
    }

    /// Valida a configuração e produz a forma usada na escrita.
    pub fn resolve(&self) -> Result<WriterConfig> {
        let requested = Encoding::for_label(self.encoding.trim().as_bytes())
            .ok_or_else(|| ConllError::UnknownEncoding(self.encoding.clone()))?;
        // UTF-16 e afins não são codificações de saída no encoding_rs
        let encoding = requested.output_encoding();
        if encoding != requested {
            warn!(
                requested = requested.name(),
                used = encoding.name(),
                "codificação não suportada para escrita, usando substituta"
            );
        }

        if self.filename_suffix.is_empty() {
            return Err(ConllError::Config("filename_suffix não pode ser vazio".into()));
        }
        if self.placeholder.is_empty() || self.placeholder.chars().any(char::is_whitespace) {
            return Err(ConllError::Config(format!(
                "placeholder inválido `{}`: deve ser não vazio e sem espaços",
                self.placeholder
            )));
        }

        let mut columns = self.effective_columns();
        if self.columns.is_some() && !self.write_named_entity {
            columns.retain(|c| *c != Column::Layer(Layer::NamedEntity));
        }
        if columns.is_empty() {
            return Err(ConllError::Config("nenhuma coluna configurada".into()));
        }
        let mut seen = HashSet::new();
        if let Some(duplicate) = columns.iter().find(|c| !seen.insert(*c)) {
            return Err(ConllError::Config(format!("coluna `{duplicate}` repetida")));
        }

        Ok(WriterConfig {
            columns,
            encoding,
            filename_suffix: self.filename_suffix.clone(),
            placeholder: self.placeholder.clone(),
            missing_attribute: self.missing_attribute,
            absent_layer: self.absent_layer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{UTF_8, WINDOWS_1252};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_resolves_to_writer_default() {
        let resolved = ConllConfig::default().resolve().unwrap();
        let expected = WriterConfig::default();
        assert_eq!(resolved.columns, expected.columns);
        assert_eq!(resolved.encoding, UTF_8);
        assert_eq!(resolved.filename_suffix, ".conll");
        assert_eq!(resolved.placeholder, "_");
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(ConllConfig::from_toml_str("").unwrap(), ConllConfig::default());
    }

    #[test]
    fn test_toml_fields() {
        let config = ConllConfig::from_toml_str(
            r#"
            encoding = "latin1"
            filename_suffix = ".bio"
            extra_layers = ["chunk"]
            layout = "unindexed"
            missing_attribute = "fail"
            absent_layer = "omit"
            parallel = true
            "#,
        )
        .unwrap();
        let resolved = config.resolve().unwrap();

        assert_eq!(
            resolved.columns,
            vec![
                Column::Text,
                Column::Lemma,
                Column::Pos,
                Column::Layer(Layer::NamedEntity),
                Column::Layer(Layer::Chunk),
            ]
        );
        // "latin1" é windows-1252 no WHATWG
        assert_eq!(resolved.encoding, WINDOWS_1252);
        assert_eq!(resolved.missing_attribute, MissingAttributePolicy::Fail);
        assert_eq!(resolved.absent_layer, AbsentLayerPolicy::Omit);
        assert!(config.parallel);
    }

    #[test]
    fn test_named_entity_can_be_disabled() {
        let config = ConllConfig {
            write_named_entity: false,
            extra_layers: vec![Layer::Chunk],
            ..Default::default()
        };
        let columns = config.resolve().unwrap().columns;
        assert!(!columns.contains(&Column::Layer(Layer::NamedEntity)));
        assert_eq!(columns.last(), Some(&Column::Layer(Layer::Chunk)));

        let explicit = ConllConfig {
            write_named_entity: false,
            columns: Some(vec![Column::Text, Column::Layer(Layer::NamedEntity)]),
            ..Default::default()
        };
        assert_eq!(explicit.resolve().unwrap().columns, vec![Column::Text]);
    }

    #[test]
    fn test_explicit_columns() {
        let config = ConllConfig::from_toml_str(r#"columns = ["token", "pos", "chunk", "named_entity"]"#).unwrap();
        assert_eq!(
            config.resolve().unwrap().columns,
            vec![
                Column::Text,
                Column::Pos,
                Column::Layer(Layer::Chunk),
                Column::Layer(Layer::NamedEntity),
            ]
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let unknown = ConllConfig {
            encoding: "klingon".into(),
            ..Default::default()
        };
        assert!(matches!(unknown.resolve(), Err(ConllError::UnknownEncoding(_))));

        let suffix = ConllConfig {
            filename_suffix: String::new(),
            ..Default::default()
        };
        assert!(matches!(suffix.resolve(), Err(ConllError::Config(_))));

        let placeholder = ConllConfig {
            placeholder: "a b".into(),
            ..Default::default()
        };
        assert!(matches!(placeholder.resolve(), Err(ConllError::Config(_))));

        let duplicate = ConllConfig {
            columns: Some(vec![Column::Text, Column::Text]),
            ..Default::default()
        };
        assert!(duplicate.resolve().unwrap_err().to_string().contains("token"));

        let empty = ConllConfig {
            columns: Some(vec![]),
            ..Default::default()
        };
        assert!(matches!(empty.resolve(), Err(ConllError::Config(_))));
    }

    #[test]
    fn test_utf16_falls_back_to_utf8() {
        let config = ConllConfig {
            encoding: "utf-16le".into(),
            ..Default::default()
        };
        assert_eq!(config.resolve().unwrap().encoding, UTF_8);
    }

    #[test]
    fn test_toml_round_trip_and_file() {
        let config = ConllConfig {
            extra_layers: vec![Layer::Chunk, Layer::Custom("srl".into())],
            parallel: true,
            ..Default::default()
        };
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("extra_layers"));

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        assert_eq!(ConllConfig::from_file(file.path()).unwrap(), config);
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let err = ConllConfig::from_toml_str("layout = \"sideways\"").unwrap_err();
        assert!(matches!(err, ConllError::Config(_)));
    }
}
