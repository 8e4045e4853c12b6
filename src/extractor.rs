use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use swc_common::sync::Lrc;
use swc_common::{FileName, SourceMap, Spanned};
use swc_ecma_ast::{
    CallExpr, Callee, Expr, ExprOrSpread, Lit, MemberProp, Module, OptCall, OptChainBase, Tpl,
};
use swc_ecma_parser::{lexer::Lexer, EsSyntax, Parser, StringInput, Syntax};
use swc_ecma_visit::{Visit, VisitWith};

use crate::catalogue::Catalogue;
use crate::config::ExtractorConfig;
use crate::error::{ExtractError, ParseError, Result};
use crate::fallback::FallbackExtractor;
use crate::files::FileSelector;
use crate::logging::{LogLevel, LogRecord, Logger, StderrLogger};
use crate::recorder::{MessageRecord, MessageRecorder};

/// Visitor that collects `Translator.trans(...)` style call sites
pub struct TranslatorCallVisitor<'a> {
    config: &'a ExtractorConfig,
    /// Source map for line number lookup
    source_map: Lrc<SourceMap>,
    file: &'a Path,
    pub records: Vec<MessageRecord>,
}

impl<'a> TranslatorCallVisitor<'a> {
    pub fn new(config: &'a ExtractorConfig, source_map: Lrc<SourceMap>, file: &'a Path) -> Self {
        Self {
            config,
            source_map,
            file,
            records: Vec::new(),
        }
    }

    /// `Object.method(...)` where both names are configured identifiers.
    /// Computed access (`Translator['trans']`) and any other callee shape
    /// are rejected.
    fn is_translator_call(&self, callee: &Callee) -> bool {
        match callee {
            Callee::Expr(expr) => self.is_translator_member(expr),
            _ => false,
        }
    }

    /// `Translator.trans`, also reached through `Translator?.trans`.
    fn is_translator_member(&self, expr: &Expr) -> bool {
        let member = match expr {
            Expr::Member(member) => member,
            Expr::OptChain(chain) => match chain.base.as_ref() {
                OptChainBase::Member(member) => member,
                _ => return false,
            },
            _ => return false,
        };
        match (member.obj.as_ref(), &member.prop) {
            (Expr::Ident(obj), MemberProp::Ident(prop)) => {
                self.config.is_translator_object(obj.sym.as_ref())
                    && self.config.is_translator_method(prop.sym.as_ref())
            }
            _ => false,
        }
    }

    fn message_record(&self, args: &[ExprOrSpread]) -> Option<MessageRecord> {
        let first = args.first()?;
        if first.spread.is_some() {
            return None;
        }

        let message = match first.expr.as_ref() {
            Expr::Lit(Lit::Str(s)) => s.value.as_str().map(|s| s.to_string()),
            Expr::Tpl(tpl) => static_template_value(tpl),
            _ => None,
        }?;
        if message.is_empty() {
            return None;
        }

        let line = self.source_map.lookup_char_pos(first.expr.span().lo).line;

        Some(MessageRecord {
            message,
            domain: self.domain_of(args),
            file: self.file.to_path_buf(),
            line: Some(line),
        })
    }

    /// The last argument names the domain when there are more than two
    /// arguments and it is a string literal.
    fn domain_of(&self, args: &[ExprOrSpread]) -> String {
        let explicit = match args.last() {
            Some(last) if args.len() > 2 && last.spread.is_none() => match last.expr.as_ref() {
                Expr::Lit(Lit::Str(s)) => s.value.as_str().map(|s| s.to_string()),
                _ => None,
            },
            _ => None,
        };
        explicit.unwrap_or_else(|| self.config.default_domain.clone())
    }
}

/// Value of a template literal without interpolation.
///
/// `` `hello` `` yields `hello`; `` `hello ${name}` `` cannot name a catalogue
/// key and yields nothing.
fn static_template_value(tpl: &Tpl) -> Option<String> {
    if !tpl.exprs.is_empty() || tpl.quasis.len() != 1 {
        return None;
    }

    let quasi = &tpl.quasis[0];
    if let Some(cooked) = quasi.cooked.as_ref() {
        return cooked.as_str().map(|s| s.to_string());
    }
    Some(quasi.raw.to_string())
}

impl Visit for TranslatorCallVisitor<'_> {
    fn visit_call_expr(&mut self, call: &CallExpr) {
        if self.is_translator_call(&call.callee) {
            if let Some(record) = self.message_record(&call.args) {
                self.records.push(record);
            }
        }

        // Translator calls nested in arguments are call sites too
        call.visit_children_with(self);
    }

    fn visit_opt_call(&mut self, call: &OptCall) {
        if self.is_translator_member(&call.callee) {
            if let Some(record) = self.message_record(&call.args) {
                self.records.push(record);
            }
        }

        call.visit_children_with(self);
    }
}

/// Parse `source` as an ES module with JSX enabled.
///
/// Any error the parser reports, including ones it recovered from, fails
/// the whole parse.
pub fn parse_module(
    source_map: &Lrc<SourceMap>,
    source: &str,
    path: &Path,
) -> Result<Module, ParseError> {
    let fm = source_map.new_source_file(
        FileName::Real(path.to_path_buf()).into(),
        source.to_string(),
    );

    let syntax = Syntax::Es(EsSyntax {
        jsx: true,
        ..Default::default()
    });

    let lexer = Lexer::new(syntax, Default::default(), StringInput::from(&*fm), None);
    let mut parser = Parser::new_from(lexer);

    let parsed = parser.parse_module();
    let recovered = parser.take_errors();

    let error = match parsed {
        Ok(module) => match recovered.into_iter().next() {
            None => return Ok(module),
            Some(error) => error,
        },
        Err(error) => error,
    };

    let loc = source_map.lookup_char_pos(error.span().lo);
    Err(ParseError {
        message: error.kind().msg().into_owned(),
        line: loc.line,
    })
}

/// Collect call sites through the syntax tree.
///
/// The source map and tree live only for the duration of this call, so
/// parser memory is released before the next file is read.
pub fn extract_from_ast(
    config: &ExtractorConfig,
    source: &str,
    path: &Path,
) -> Result<Vec<MessageRecord>, ParseError> {
    let cm: Lrc<SourceMap> = Default::default();
    let module = parse_module(&cm, source, path)?;

    let mut visitor = TranslatorCallVisitor::new(config, cm, path);
    module.visit_with(&mut visitor);
    Ok(visitor.records)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Ast,
    Fallback,
}

/// Call sites found in one file and how they were found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileExtraction {
    pub file: PathBuf,
    pub strategy: Strategy,
    pub records: Vec<MessageRecord>,
}

/// Totals of an extraction run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub files_processed: usize,
    /// Files the parser rejected, extracted with the regex fallback
    pub fallback_files: Vec<PathBuf>,
    /// Files that could not be read
    pub skipped_files: Vec<PathBuf>,
    pub messages_recorded: usize,
}

/// Extracts translator messages from JavaScript files into a catalogue.
pub struct JsExtractor {
    config: ExtractorConfig,
    selector: FileSelector,
    fallback: FallbackExtractor,
    recorder: MessageRecorder,
    logger: Arc<dyn Logger>,
}

impl JsExtractor {
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            selector: FileSelector::new(&config)?,
            fallback: FallbackExtractor::new(&config)?,
            recorder: MessageRecorder::new(config.prefix.clone()),
            logger: Arc::new(StderrLogger),
            config,
        })
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract every candidate file under `resources`, one file at a time.
    pub fn extract<P, C>(&self, resources: &[P], catalogue: &mut C) -> Result<ExtractionSummary>
    where
        P: AsRef<Path>,
        C: Catalogue + ?Sized,
    {
        let files = self.selector.select(resources)?;
        let mut summary = ExtractionSummary::default();

        for path in &files {
            match self.extract_file(path) {
                Ok(extraction) => self.apply(&extraction, catalogue, &mut summary),
                Err(error) => self.skip(path, &error, &mut summary),
            }
        }

        Ok(summary)
    }

    /// Like [`JsExtractor::extract`], but files are parsed on the rayon pool.
    ///
    /// Records are written by the calling thread in file order, so the
    /// catalogue ends up identical to a sequential run.
    pub fn extract_parallel<P, C>(
        &self,
        resources: &[P],
        catalogue: &mut C,
    ) -> Result<ExtractionSummary>
    where
        P: AsRef<Path>,
        C: Catalogue + ?Sized,
    {
        let files = self.selector.select(resources)?;

        let extractions: Vec<(&PathBuf, Result<FileExtraction>)> = files
            .par_iter()
            .map(|path| (path, self.extract_file(path)))
            .collect();

        let mut summary = ExtractionSummary::default();
        for (path, extraction) in &extractions {
            match extraction {
                Ok(extraction) => self.apply(extraction, catalogue, &mut summary),
                Err(error) => self.skip(path, error, &mut summary),
            }
        }

        Ok(summary)
    }

    /// Read one file and extract it.
    ///
    /// Bytes that are not valid UTF-8 are replaced rather than rejected, so
    /// legacy encodings still yield their ASCII call sites.
    pub fn extract_file(&self, path: &Path) -> Result<FileExtraction> {
        let bytes = std::fs::read(path).map_err(|source| ExtractError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let source = String::from_utf8_lossy(&bytes);
        Ok(self.extract_source(&source, path))
    }

    /// Run the AST extractor on `source`, or the regex fallback when the
    /// parser rejects it.
    pub fn extract_source(&self, source: &str, path: &Path) -> FileExtraction {
        match extract_from_ast(&self.config, source, path) {
            Ok(records) => FileExtraction {
                file: path.to_path_buf(),
                strategy: Strategy::Ast,
                records,
            },
            Err(error) => {
                self.logger.log(
                    &LogRecord::new(
                        LogLevel::Warn,
                        "Error parsing {file}: {message} (at line {line}).",
                    )
                    .with("file", path.display())
                    .with("message", &error.message)
                    .with("line", error.line)
                    .with("exception", format!("{:?}", error)),
                );
                self.logger.log(&LogRecord::new(
                    LogLevel::Warn,
                    "Falling back to regex matching to extract translations.",
                ));

                FileExtraction {
                    file: path.to_path_buf(),
                    strategy: Strategy::Fallback,
                    records: self.fallback.extract(source, path),
                }
            }
        }
    }

    /// A file that could not be read is reported and left out; the rest of
    /// the run continues.
    fn skip(&self, path: &Path, error: &ExtractError, summary: &mut ExtractionSummary) {
        self.logger.log(
            &LogRecord::new(LogLevel::Warn, "Skipping {file}: {message}")
                .with("file", path.display())
                .with("message", error),
        );
        summary.skipped_files.push(path.to_path_buf());
    }

    fn apply<C: Catalogue + ?Sized>(
        &self,
        extraction: &FileExtraction,
        catalogue: &mut C,
        summary: &mut ExtractionSummary,
    ) {
        for record in &extraction.records {
            self.recorder.record(catalogue, record);
        }

        self.logger.log(
            &LogRecord::new(LogLevel::Debug, "Extracted {count} message(s) from {file}")
                .with("count", extraction.records.len())
                .with("file", extraction.file.display()),
        );

        summary.files_processed += 1;
        summary.messages_recorded += extraction.records.len();
        if extraction.strategy == Strategy::Fallback {
            summary.fallback_files.push(extraction.file.clone());
        }
    }
}
