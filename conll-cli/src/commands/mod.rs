//! Subcomandos da linha de comando

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use conll_core::{ConllConfig, Layer, Layout};

pub mod check;
pub mod convert;
pub mod generate_config;
pub mod sample;

/// Subcomandos disponíveis
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Converte documentos JSON em arquivos CoNLL, um arquivo por documento
    Convert(convert::ConvertArgs),

    /// Verifica um arquivo CoNLL: número de colunas e sequências BIO
    Check(check::CheckArgs),

    /// Gera um arquivo de configuração TOML com os valores padrão
    GenerateConfig(generate_config::GenerateConfigArgs),

    /// Escreve o documento de exemplo em JSON
    Sample(sample::SampleArgs),
}

impl Commands {
    pub fn execute(&self) -> Result<()> {
        match self {
            Commands::Convert(args) => args.execute(),
            Commands::Check(args) => args.execute(),
            Commands::GenerateConfig(args) => args.execute(),
            Commands::Sample(args) => args.execute(),
        }
    }
}

/// Opções de formato compartilhadas por `convert` e `check`.
///
/// Cada opção dada na linha de comando sobrescreve o valor do arquivo `-c`.
#[derive(Debug, Default, Args)]
pub struct FormatArgs {
    /// Arquivo de configuração TOML
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Codificação de saída (ex: UTF-8, ISO-8859-1)
    #[arg(short, long, value_name = "LABEL")]
    pub encoding: Option<String>,

    /// Sufixo do arquivo de saída
    #[arg(short, long, value_name = "SUFFIX")]
    pub suffix: Option<String>,

    /// Não escreve a coluna de entidades nomeadas
    #[arg(long)]
    pub no_named_entity: bool,

    /// Camada adicional, escrita depois das entidades (ex: chunk)
    #[arg(short, long = "layer", value_name = "LAYER")]
    pub layers: Vec<String>,

    /// Omite a coluna de índice
    #[arg(long)]
    pub unindexed: bool,
}

impl FormatArgs {
    /// Carrega o arquivo de configuração (se houver) e aplica as opções.
    pub fn load_config(&self) -> Result<ConllConfig> {
        let mut config = match &self.config {
            Some(path) => ConllConfig::from_file(path)
                .with_context(|| format!("falha ao ler a configuração {}", path.display()))?,
            None => ConllConfig::default(),
        };

        if let Some(encoding) = &self.encoding {
            config.encoding = encoding.clone();
        }
        if let Some(suffix) = &self.suffix {
            config.filename_suffix = suffix.clone();
        }
        if self.no_named_entity {
            config.write_named_entity = false;
        }
        for name in &self.layers {
            let layer = Layer::from(name.as_str());
            if !config.extra_layers.contains(&layer) {
                config.extra_layers.push(layer);
            }
        }
        if self.unindexed {
            config.layout = Layout::Unindexed;
        }

        tracing::debug!(?config, "configuração carregada");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_flags_override_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("conll.toml");
        fs::write(&path, "encoding = \"latin1\"\nfilename_suffix = \".bio\"\n").unwrap();

        let args = FormatArgs {
            config: Some(path),
            suffix: Some(".txt".into()),
            layers: vec!["chunk".into(), "chunks".into()],
            unindexed: true,
            ..Default::default()
        };
        let config = args.load_config().unwrap();

        assert_eq!(config.encoding, "latin1");
        assert_eq!(config.filename_suffix, ".txt");
        assert_eq!(config.extra_layers, vec![Layer::Chunk]);
        assert_eq!(config.layout, Layout::Unindexed);
        assert!(config.write_named_entity);
    }

    #[test]
    fn test_missing_config_file_has_context() {
        let args = FormatArgs {
            config: Some(PathBuf::from("/nonexistent/conll.toml")),
            ..Default::default()
        };
        let err = args.load_config().unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/conll.toml"));
    }
}
