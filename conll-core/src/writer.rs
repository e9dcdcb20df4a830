//! # Escrita no Formato CoNLL
//!
//! Serializa linhas ([`Row`]) em texto, uma linha por token, colunas separadas
//! por **um único espaço**, e exatamente uma linha em branco depois de cada
//! sentença (inclusive a última, e inclusive sentenças vazias):
//!
//! ```text
//! 1 Pierre Pierre NNP B-person
//! 2 Vinken Vinken NNP I-person
//! 3 , , , O
//!
//! ```
//!
//! A ordem e a presença das colunas são o contrato de compatibilidade; elas
//! vêm de [`WriterConfig::columns`]. A codificação de saída é qualquer rótulo
//! WHATWG aceito pelo `encoding_rs` (padrão UTF-8).
//!
//! ## Recurso com escopo
//!
//! O [`TableWriter`] é dono do destino durante a conversão de um documento.
//! [`TableWriter::finish`] descarrega e libera o destino e deve ser chamado
//! também nos caminhos de erro: o que já foi escrito é preservado. Depois de
//! uma falha de escrita o writer recusa qualquer escrita nova.

use std::fmt;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use encoding_rs::{Encoding, UTF_8};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::document::{Document, Layer};
use crate::row::{MissingAttributePolicy, Row};

/// Uma coluna da tabela de saída.
///
/// Nomes aceitos na configuração: `index`, `token`, `lemma`, `pos`, ou o nome
/// de uma camada (`named_entity`, `chunk`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Column {
    /// Posição do token na sentença (base 1).
    Index,
    /// Texto do token.
    Text,
    Lemma,
    /// Tag morfossintática.
    Pos,
    /// Rótulos BIO de uma camada.
    Layer(Layer),
}

impl Column {
    pub fn name(&self) -> &str {
        match self {
            Column::Index => "index",
            Column::Text => "token",
            Column::Lemma => "lemma",
            Column::Pos => "pos",
            Column::Layer(layer) => layer.name(),
        }
    }
}

impl From<&str> for Column {
    fn from(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "index" | "id" => Column::Index,
            "token" | "text" | "form" => Column::Text,
            "lemma" => Column::Lemma,
            "pos" | "postag" => Column::Pos,
            _ => Column::Layer(Layer::from(name)),
        }
    }
}

impl From<String> for Column {
    fn from(name: String) -> Self {
        Column::from(name.as_str())
    }
}

impl From<Column> for String {
    fn from(column: Column) -> Self {
        column.name().to_string()
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Conjuntos de colunas base; as camadas habilitadas são acrescentadas ao final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// `index token lemma pos`, ex: `1 Vinken Vinken NNP B-person`.
    #[default]
    Indexed,
    /// `token lemma pos`, sem índice na frente.
    Unindexed,
}

impl Layout {
    pub fn base_columns(&self) -> Vec<Column> {
        match self {
            Layout::Indexed => vec![Column::Index, Column::Text, Column::Lemma, Column::Pos],
            Layout::Unindexed => vec![Column::Text, Column::Lemma, Column::Pos],
        }
    }
}

/// O que escrever na coluna de uma camada que a sentença não possui.
///
/// Camada presente mas sem spans é sempre `O`; isto trata apenas da camada
/// que nenhum produtor anexou.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsentLayerPolicy {
    /// Todos os tokens recebem `O`.
    #[default]
    Outside,
    /// A coluna recebe o placeholder (`_`).
    Placeholder,
    /// A coluna é omitida nas linhas dessa sentença.
    Omit,
}

/// Configuração já validada da escrita.
///
/// Normalmente obtida de [`ConllConfig::resolve`](crate::config::ConllConfig::resolve).
#[derive(Debug, Clone)]
pub struct WriterConfig {
    pub columns: Vec<Column>,
    pub encoding: &'static Encoding,
    pub filename_suffix: String,
    /// Valor escrito no lugar de atributos ausentes.
    pub placeholder: String,
    pub missing_attribute: MissingAttributePolicy,
    pub absent_layer: AbsentLayerPolicy,
}

impl Default for WriterConfig {
    fn default() -> Self {
        let mut columns = Layout::Indexed.base_columns();
        columns.push(Column::Layer(Layer::NamedEntity));
        Self {
            columns,
            encoding: UTF_8,
            filename_suffix: ".conll".to_string(),
            placeholder: "_".to_string(),
            missing_attribute: MissingAttributePolicy::default(),
            absent_layer: AbsentLayerPolicy::default(),
        }
    }
}

impl WriterConfig {
    /// Camadas configuradas, na ordem das colunas.
    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.columns.iter().filter_map(|c| match c {
            Column::Layer(layer) => Some(layer),
            _ => None,
        })
    }

    /// Caminho do arquivo de saída: `<dir>/<nome base do documento><sufixo>`.
    pub fn output_path(&self, dir: &Path, document: &Document) -> PathBuf {
        dir.join(format!("{}{}", document.base_name(), self.filename_suffix))
    }
}

/// Escritor de tabelas CoNLL sobre qualquer destino `Write`.
pub struct TableWriter<'c, W: Write> {
    sink: BufWriter<W>,
    config: &'c WriterConfig,
    line: String,
    sentences: usize,
    rows: usize,
    failed: bool,
}

impl<'c, W: Write> TableWriter<'c, W> {
    pub fn new(sink: W, config: &'c WriterConfig) -> Self {
        Self {
            sink: BufWriter::new(sink),
            config,
            line: String::with_capacity(128),
            sentences: 0,
            rows: 0,
            failed: false,
        }
    }

    /// Escreve as linhas de uma sentença seguidas de uma linha em branco.
    pub fn write_sentence(&mut self, rows: &[Row<'_>]) -> io::Result<()> {
        for row in rows {
            self.render(row);
            self.emit_line()?;
            self.rows += 1;
        }
        self.line.clear();
        self.line.push('\n');
        self.emit_line()?;
        self.sentences += 1;
        Ok(())
    }

    pub fn sentences_written(&self) -> usize {
        self.sentences
    }

    pub fn rows_written(&self) -> usize {
        self.rows
    }

    /// Descarrega o buffer e devolve o destino.
    pub fn finish(self) -> io::Result<W> {
        self.sink.into_inner().map_err(|e| e.into_error())
    }

    fn render(&mut self, row: &Row<'_>) {
        let placeholder = self.config.placeholder.as_str();
        let omit_from = self.omitted_from(row);
        self.line.clear();

        let mut layer = 0;
        for column in &self.config.columns[..omit_from] {
            match column {
                Column::Index => push_field(&mut self.line, &row.id.to_string(), placeholder),
                Column::Text => push_field(&mut self.line, row.text(), placeholder),
                Column::Lemma => push_field(&mut self.line, row.lemma.unwrap_or(placeholder), placeholder),
                Column::Pos => push_field(&mut self.line, row.pos.unwrap_or(placeholder), placeholder),
                Column::Layer(_) => {
                    match row.labels.get(layer).copied().flatten() {
                        Some(tag) => push_field(&mut self.line, &tag.to_string(), placeholder),
                        None => push_field(&mut self.line, placeholder, placeholder),
                    }
                    layer += 1;
                }
            }
        }
        self.line.push('\n');
    }

    /// Posição da primeira coluna omitida com [`AbsentLayerPolicy::Omit`].
    ///
    /// Só o bloco final de camadas ausentes pode sumir; uma camada ausente
    /// seguida de outra presente recebe o placeholder, senão os rótulos da
    /// seguinte cairiam na coluna errada.
    fn omitted_from(&self, row: &Row<'_>) -> usize {
        let columns = &self.config.columns;
        if self.config.absent_layer != AbsentLayerPolicy::Omit {
            return columns.len();
        }

        let mut layer = row.labels.len();
        let mut from = columns.len();
        for column in columns.iter().rev() {
            if !matches!(column, Column::Layer(_)) {
                break;
            }
            layer = layer.saturating_sub(1);
            if row.label(layer).is_some() {
                break;
            }
            from -= 1;
        }
        from
    }

    fn emit_line(&mut self) -> io::Result<()> {
        if self.failed {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "destino já falhou; escrita interrompida",
            ));
        }

        let result = if self.config.encoding == UTF_8 {
            self.sink.write_all(self.line.as_bytes())
        } else {
            let (bytes, _, had_errors) = self.config.encoding.encode(&self.line);
            if had_errors {
                warn!(
                    encoding = self.config.encoding.name(),
                    line = self.line.trim_end(),
                    "caracteres sem representação na codificação de saída"
                );
            }
            self.sink.write_all(&bytes)
        };

        if result.is_err() {
            self.failed = true;
        }
        result
    }
}

/// Acrescenta um campo à linha.
///
/// Um campo não pode ser vazio nem conter espaços, senão a contagem de
/// colunas se perde: vazio vira placeholder e cada sequência de espaços vira `_`.
fn push_field(line: &mut String, value: &str, placeholder: &str) {
    if !line.is_empty() {
        line.push(' ');
    }

    let value = value.trim();
    if value.is_empty() {
        line.push_str(placeholder);
        return;
    }

    let mut in_space = false;
    for c in value.chars() {
        if c.is_whitespace() {
            if !in_space {
                line.push('_');
            }
            in_space = true;
        } else {
            line.push(c);
            in_space = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Sentence;
    use crate::row::RowBuilder;
    use crate::span::Span;
    use crate::token::Token;

    fn write(config: &WriterConfig, sentences: &[Sentence]) -> String {
        let builder = RowBuilder::new(&config.columns, config.missing_attribute, config.absent_layer);
        let mut writer = TableWriter::new(Vec::new(), config);
        for (i, sentence) in sentences.iter().enumerate() {
            let rows = builder.build("d", i, sentence).unwrap();
            writer.write_sentence(&rows).unwrap();
        }
        String::from_utf8(writer.finish().unwrap()).unwrap()
    }

    fn pierre() -> Sentence {
        Sentence::new(vec![
            Token::new("Pierre").with_pos("NNP"),
            Token::new("Vinken").with_pos("NNP"),
            Token::new(",").with_pos(","),
        ])
        .with_spans(Layer::NamedEntity, vec![Span::new("person", 0, 1)])
    }

    #[test]
    fn test_indexed_layout() {
        let out = write(&WriterConfig::default(), &[pierre()]);
        assert_eq!(
            out,
            "1 Pierre Pierre NNP B-person\n2 Vinken Vinken NNP I-person\n3 , , , O\n\n"
        );
    }

    #[test]
    fn test_unindexed_layout() {
        let mut config = WriterConfig::default();
        config.columns = Layout::Unindexed.base_columns();
        config.columns.push(Column::Layer(Layer::NamedEntity));

        let out = write(&config, &[pierre()]);
        assert_eq!(out.lines().next(), Some("Pierre Pierre NNP B-person"));
    }

    #[test]
    fn test_blank_line_after_every_sentence() {
        let out = write(&WriterConfig::default(), &[pierre(), Sentence::default(), pierre()]);
        assert_eq!(out.lines().filter(|l| l.is_empty()).count(), 3);
        assert!(out.ends_with("O\n\n"));
    }

    #[test]
    fn test_empty_sentence_writes_only_separator() {
        let out = write(&WriterConfig::default(), &[Sentence::default()]);
        assert_eq!(out, "\n");
    }

    #[test]
    fn test_missing_pos_becomes_placeholder() {
        let out = write(&WriterConfig::default(), &[Sentence::from_words(["61"])]);
        assert_eq!(out, "1 61 61 _ O\n\n");
    }

    #[test]
    fn test_whitespace_inside_fields_is_collapsed() {
        let sentence = Sentence::new(vec![Token::new("New  York").with_pos("NNP"), Token::new(" ")]);
        let out = write(&WriterConfig::default(), &[sentence]);
        assert_eq!(out, "1 New_York New_York NNP O\n2 _ _ _ O\n\n");
    }

    #[test]
    fn test_absent_layer_placeholder_and_omit() {
        let mut config = WriterConfig::default();
        config.columns.push(Column::Layer(Layer::Chunk));

        config.absent_layer = AbsentLayerPolicy::Placeholder;
        let out = write(&config, &[pierre()]);
        assert_eq!(out.lines().next(), Some("1 Pierre Pierre NNP B-person _"));

        config.absent_layer = AbsentLayerPolicy::Omit;
        let out = write(&config, &[pierre()]);
        assert_eq!(out.lines().next(), Some("1 Pierre Pierre NNP B-person"));
    }

    #[test]
    fn test_omit_keeps_columns_of_later_layers() {
        let mut config = WriterConfig::default();
        config.columns.push(Column::Layer(Layer::Chunk));
        config.absent_layer = AbsentLayerPolicy::Omit;

        let board = Sentence::from_words(["the", "board"]).with_spans(Layer::Chunk, vec![Span::new("NP", 0, 1)]);
        let out = write(&config, &[board]);
        assert_eq!(out, "1 the the _ _ B-NP\n2 board board _ _ I-NP\n\n");

        let bare = Sentence::from_words(["ok"]);
        assert_eq!(write(&config, &[bare]), "1 ok ok _\n\n");
    }

    #[test]
    fn test_counts() {
        let config = WriterConfig::default();
        let builder = RowBuilder::new(&config.columns, config.missing_attribute, config.absent_layer);
        let sentence = pierre();
        let mut writer = TableWriter::new(Vec::new(), &config);
        writer.write_sentence(&builder.build("d", 0, &sentence).unwrap()).unwrap();
        writer.write_sentence(&[]).unwrap();
        assert_eq!(writer.sentences_written(), 2);
        assert_eq!(writer.rows_written(), 3);
    }

    #[test]
    fn test_latin1_output() {
        let mut config = WriterConfig::default();
        config.encoding = Encoding::for_label(b"ISO-8859-1").unwrap();

        let sentence = Sentence::new(vec![Token::new("São").with_pos("NNP")]);
        let builder = RowBuilder::new(&config.columns, config.missing_attribute, config.absent_layer);
        let rows = builder.build("d", 0, &sentence).unwrap();
        let mut writer = TableWriter::new(Vec::new(), &config);
        writer.write_sentence(&rows).unwrap();
        let bytes = writer.finish().unwrap();

        // "ã" ocupa um único byte (0xE3) em windows-1252
        assert!(bytes.windows(3).any(|w| w == [b'S', 0xE3, b'o']));
        assert!(std::str::from_utf8(&bytes).is_err());
    }

    /// Destino que aceita `limit` bytes e depois falha.
    struct FailingSink {
        written: Vec<u8>,
        limit: usize,
    }

    impl Write for FailingSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.written.len() + buf.len() > self.limit {
                return Err(io::Error::new(io::ErrorKind::Other, "disco cheio"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_writer_stops_after_sink_failure() {
        let config = WriterConfig::default();
        let builder = RowBuilder::new(&config.columns, config.missing_attribute, config.absent_layer);
        let sentence = pierre();
        let rows = builder.build("d", 0, &sentence).unwrap();

        let sink = FailingSink { written: Vec::new(), limit: 4 };
        let mut writer = TableWriter {
            sink: BufWriter::with_capacity(1, sink),
            config: &config,
            line: String::new(),
            sentences: 0,
            rows: 0,
            failed: false,
        };

        assert!(writer.write_sentence(&rows).is_err());
        let err = writer.write_sentence(&rows).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_column_names() {
        assert_eq!(Column::from("id"), Column::Index);
        assert_eq!(Column::from("FORM"), Column::Text);
        assert_eq!(Column::from("chunk"), Column::Layer(Layer::Chunk));
        assert_eq!(String::from(Column::Layer(Layer::NamedEntity)), "named_entity");
        assert_eq!(Column::Text.to_string(), "token");
    }

    #[test]
    fn test_output_path() {
        let config = WriterConfig::default();
        let doc = Document::new("corpus/document.txt");
        assert_eq!(
            config.output_path(Path::new("out"), &doc),
            PathBuf::from("out/document.txt.conll")
        );
    }
}
