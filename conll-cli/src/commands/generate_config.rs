//! Comando `generate-config`

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use conll_core::ConllConfig;

#[derive(Debug, Args)]
pub struct GenerateConfigArgs {
    /// Arquivo de saída
    #[arg(short, long, value_name = "FILE", required = true)]
    pub output: PathBuf,
}

const HEADER: &str = r#"# Configuração do conll
#
# encoding           rótulo WHATWG da codificação de saída (UTF-8, ISO-8859-1, ...)
# filename_suffix    sufixo acrescentado ao nome do documento
# write_named_entity escreve a coluna de entidades nomeadas
# extra_layers       camadas adicionais, na ordem das colunas (ex: ["chunk"])
# layout             "indexed" (index token lemma pos) ou "unindexed" (token lemma pos)
# placeholder        valor de atributos ausentes
# missing_attribute  "fallback" (lema = texto), "placeholder" ou "fail"
# absent_layer       camada não anotada: "outside" (O), "placeholder" ou "omit"
# parallel           converte documentos em paralelo
#
# Uma lista explícita substitui layout e camadas:
# columns = ["index", "token", "lemma", "pos", "named_entity", "chunk"]

"#;

impl GenerateConfigArgs {
    pub fn execute(&self) -> Result<()> {
        let template = generate_template()?;
        fs::write(&self.output, template)
            .with_context(|| format!("falha ao escrever {}", self.output.display()))?;

        println!("Configuração gerada em {}", self.output.display());
        println!("Uso: conll convert entrada.json -d saida/ -c {}", self.output.display());
        Ok(())
    }
}

fn generate_template() -> Result<String> {
    let body = ConllConfig::default()
        .to_toml_string()
        .context("falha ao serializar a configuração")?;
    Ok(format!("{HEADER}{body}"))
}
