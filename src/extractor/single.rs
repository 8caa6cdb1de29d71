use once_cell::unsync::OnceCell;
use serde::Serialize;
use std::io::Read;
use std::time::Instant;
use tracing::{debug, info, instrument};

use crate::dom::{DomDocument, TagSoupParser, TreeParser};
use crate::extractor::{
    ExtractionError, ExtractionResult, Extractor, ExtractorFactory, ExtractorGroup, Issue, Phase,
    ResultSummary,
};
use crate::locator::DocumentLocator;
use crate::mime::{ContentType, ContentTypeDetector};
use crate::stream::{ByteSource, MemoryStreamCache, StreamCache};
use crate::validator::{ValidationReport, Validator};
use crate::writer::{ExtractionContext, TripleHandler};

/// What one extractor contributed to a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractorRun {
    pub extractor: &'static str,
    pub statements: usize,
    pub issues: Vec<Issue>,
}

/// Outcome of a successful [`SingleDocumentExtraction::run`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionReport {
    pub document: DocumentLocator,
    /// `None` when detection was skipped.
    pub detected_content_type: Option<ContentType>,
    pub extractors: Vec<ExtractorRun>,
    pub validation: Option<ValidationReport>,
}

impl ExtractionReport {
    pub fn statements(&self) -> usize {
        self.extractors.iter().map(|run| run.statements).sum()
    }

    pub fn extractor_names(&self) -> Vec<&'static str> {
        self.extractors.iter().map(|run| run.extractor).collect()
    }

    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.extractors.iter().flat_map(|run| run.issues.iter())
    }
}

struct Resolution {
    detected: Option<ContentType>,
    matching: ExtractorGroup,
}

/// Per-document resources, each acquired on first use.
struct DocumentResources {
    locator: DocumentLocator,
    source: Box<dyn ByteSource>,
    cache: Box<dyn StreamCache>,
    detector: Option<Box<dyn ContentTypeDetector>>,
    parser: Box<dyn TreeParser>,
    validator: Option<Validator>,
    apply_fixes: bool,
    parsed: OnceCell<DomDocument>,
    validation: OnceCell<Option<ValidationReport>>,
}

impl DocumentResources {
    fn open_stream(&self, phase: Phase) -> Result<Box<dyn Read>, ExtractionError> {
        let opener = self
            .cache
            .cache(self.source.as_ref(), &self.locator)
            .map_err(|source| ExtractionError::Io {
                phase: Phase::Caching,
                source,
            })?;
        opener
            .open_stream()
            .map_err(|source| ExtractionError::Io { phase, source })
    }

    fn parsed(&self) -> Result<&DomDocument, ExtractionError> {
        self.parsed.get_or_try_init(|| {
            let mut stream = self.open_stream(Phase::Parsing)?;
            self.parser
                .parse(&mut *stream, &self.locator)
                .map_err(ExtractionError::Parse)
        })
    }

    /// The parsed tree, validated once before it is handed out. A failed
    /// validation keeps the parsed tree and is retried on the next call.
    fn tree(&self) -> Result<&DomDocument, ExtractionError> {
        let document = self.parsed()?;
        self.validation.get_or_try_init(|| {
            let Some(validator) = &self.validator else {
                return Ok::<_, ExtractionError>(None);
            };
            let mut handle = document.clone();
            let report = validator.validate(&mut handle, self.apply_fixes)?;
            debug!(
                activations = report.activations.len(),
                fixes = report.fixes_applied(),
                "Validated document tree"
            );
            Ok(Some(report))
        })?;
        Ok(document)
    }

    fn dispatch(
        &self,
        name: &'static str,
        extractor: &mut Extractor,
        result: &mut ExtractionResult<'_>,
    ) -> Result<(), ExtractionError> {
        let failed = |source| ExtractionError::Extractor {
            extractor: name,
            source,
        };
        match extractor {
            Extractor::Blind(extractor) => extractor.run(&self.locator, result).map_err(failed),
            Extractor::Content(extractor) => {
                let mut stream = self.open_stream(Phase::Execution)?;
                extractor
                    .run(&mut *stream, &self.locator, result)
                    .map_err(failed)
            }
            Extractor::Dom(extractor) => {
                let document = self.tree()?;
                extractor.run(document, result).map_err(failed)
            }
        }
    }
}

/// Runs a group of extractors over one document.
///
/// The document is read from its [`ByteSource`] at most once, through the
/// configured [`StreamCache`], and parsed at most once, however many
/// extractors need it. Extractors run sequentially in group order; the first
/// failure aborts the run, leaving earlier extractors' output in the sink.
///
/// An instance is single-use per document and not meant to be shared across
/// threads. Run documents in parallel with one instance each.
pub struct SingleDocumentExtraction<H: TripleHandler> {
    resources: DocumentResources,
    extractors: ExtractorGroup,
    resolution: OnceCell<Resolution>,
    output: H,
}

impl<H: TripleHandler> SingleDocumentExtraction<H> {
    pub fn new(
        source: impl ByteSource + 'static,
        locator: &str,
        extractors: ExtractorGroup,
        output: H,
    ) -> Result<Self, ExtractionError> {
        let locator = DocumentLocator::parse(locator)?;
        Ok(Self::for_locator(source, locator, extractors, output))
    }

    /// Runs a single extractor, skipping detection.
    pub fn single(
        source: impl ByteSource + 'static,
        locator: &str,
        factory: std::sync::Arc<dyn ExtractorFactory>,
        output: H,
    ) -> Result<Self, ExtractionError> {
        Self::new(source, locator, ExtractorGroup::single(factory), output)
    }

    pub fn for_locator(
        source: impl ByteSource + 'static,
        locator: DocumentLocator,
        extractors: ExtractorGroup,
        output: H,
    ) -> Self {
        debug!(document = %locator, extractors = ?extractors, "Prepared document extraction");
        Self {
            resources: DocumentResources {
                locator,
                source: Box::new(source),
                cache: Box::new(MemoryStreamCache::new()),
                detector: None,
                parser: Box::new(TagSoupParser::new()),
                validator: None,
                apply_fixes: false,
                parsed: OnceCell::new(),
                validation: OnceCell::new(),
            },
            extractors,
            resolution: OnceCell::new(),
            output,
        }
    }

    pub fn with_stream_cache(mut self, cache: impl StreamCache + 'static) -> Self {
        self.resources.cache = Box::new(cache);
        self
    }

    pub fn with_detector(mut self, detector: impl ContentTypeDetector + 'static) -> Self {
        self.resources.detector = Some(Box::new(detector));
        self
    }

    pub fn with_parser(mut self, parser: impl TreeParser + 'static) -> Self {
        self.resources.parser = Box::new(parser);
        self
    }

    /// Validates the tree right after it is parsed, before any extractor sees it.
    pub fn with_validator(mut self, validator: Validator, apply_fixes: bool) -> Self {
        self.resources.validator = Some(validator);
        self.resources.apply_fixes = apply_fixes;
        self
    }

    pub fn locator(&self) -> &DocumentLocator {
        &self.resources.locator
    }

    pub fn output(&self) -> &H {
        &self.output
    }

    pub fn into_output(self) -> H {
        self.output
    }

    pub fn has_matching_extractors(&self) -> Result<bool, ExtractionError> {
        Ok(!self.resolve()?.matching.is_empty())
    }

    pub fn detected_content_type(&self) -> Result<Option<ContentType>, ExtractionError> {
        Ok(self.resolve()?.detected.clone())
    }

    pub fn matching_extractors(&self) -> Result<&ExtractorGroup, ExtractionError> {
        Ok(&self.resolve()?.matching)
    }

    /// The parsed (and, if configured, validated) document tree.
    pub fn document(&self) -> Result<&DomDocument, ExtractionError> {
        self.resources.tree()
    }

    fn resolve(&self) -> Result<&Resolution, ExtractionError> {
        self.resolution.get_or_try_init(|| {
            let detector = match &self.resources.detector {
                Some(detector) if !self.extractors.all_support_all_content_types() => detector,
                _ => {
                    debug!("Skipping content-type detection");
                    return Ok(Resolution {
                        detected: None,
                        matching: self.extractors.clone(),
                    });
                }
            };

            let mut stream = self.resources.open_stream(Phase::Detection)?;
            let detected = detector
                .guess(Some(self.resources.locator.path_hint()), &mut *stream, None)
                .map_err(|source| ExtractionError::Io {
                    phase: Phase::Detection,
                    source,
                })?;
            let matching = self.extractors.filter_by_content_type(&detected);
            debug!(
                content_type = %detected,
                matching = ?matching,
                "Detected content type"
            );
            Ok(Resolution {
                detected: Some(detected),
                matching,
            })
        })
    }

    /// Runs every matching extractor in group order.
    #[instrument(skip(self), fields(document = %self.resources.locator))]
    pub fn run(&mut self) -> Result<ExtractionReport, ExtractionError> {
        let started = Instant::now();
        let resolution = self.resolve()?;
        let detected = resolution.detected.clone();
        let matching = resolution.matching.clone();

        let mut runs = Vec::with_capacity(matching.len());
        for factory in matching.iter() {
            let summary = self.run_extractor(factory.as_ref())?;
            runs.push(ExtractorRun {
                extractor: factory.name(),
                statements: summary.statements,
                issues: summary.issues,
            });
        }

        self.output
            .end_document(&self.resources.locator)
            .map_err(ExtractionError::Finish)?;

        let report = ExtractionReport {
            document: self.resources.locator.clone(),
            detected_content_type: detected,
            extractors: runs,
            validation: self.resources.validation.get().cloned().flatten(),
        };
        info!(
            extractors = report.extractors.len(),
            statements = report.statements(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Extracted document"
        );
        Ok(report)
    }

    fn run_extractor(
        &mut self,
        factory: &dyn ExtractorFactory,
    ) -> Result<ResultSummary, ExtractionError> {
        let name = factory.name();
        let mut extractor = factory.create();
        if extractor.capability() != factory.capability() {
            return Err(ExtractionError::UnsupportedCapability {
                extractor: name,
                declared: factory.capability(),
                actual: extractor.capability(),
            });
        }

        debug!(extractor = name, capability = %factory.capability(), "Running extractor");
        let context = ExtractionContext::new(self.resources.locator.clone(), name);
        let mut result = ExtractionResult::open(context, &mut self.output).map_err(|source| {
            ExtractionError::Output {
                extractor: name,
                source,
            }
        })?;

        let outcome = self.resources.dispatch(name, &mut extractor, &mut result);
        let released = result.close();

        match (outcome, released) {
            (Ok(()), Ok(summary)) => Ok(summary),
            (Err(cause), Ok(_)) => Err(cause),
            (outcome, Err(source)) => Err(ExtractionError::Release {
                extractor: name,
                source,
                prior: outcome.err().map(Box::new),
            }),
        }
    }
}
