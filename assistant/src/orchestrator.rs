//! Turn orchestration: one manager message in, one rendered reply out.
//!
//! [`Assistant::handle_query`] owns the order of operations for a turn:
//! thread state first, then any pending clarification, then classification,
//! scope, entity resolution and routing. Tool failures never surface as
//! `Err`; they collapse into [`ToolOutcome::Error`] so the manager always
//! gets a reply carrying truthful scope and source bands. `Err` is reserved
//! for requests the API layer should reject outright: malformed input and
//! failed infrastructure reads.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use rota_core::intent::{ExtractedIntent, Intent};
use rota_core::query::{ClarificationKind, ClarificationRequest, QueryReply, QueryRequest};
use rota_core::thread::{PendingClarification, ThreadContext};
use rota_core::{IsoWeek, ResolvedScope, ScopeMode};
use uuid::Uuid;

use crate::catalog::{MetricCatalog, ParamValue};
use crate::classify::{HttpLlmClient, IntentClassifier, LlmClassifier, RuleClassifier};
use crate::config::{AssistantConfig, ClassifierMode};
use crate::error::AssistantError;
use crate::format;
use crate::outcome::{enforce_data_backing, SourceRead, ToolOutcome};
use crate::query::{AdHocQuery, QueryBackend, QueryExecutor, ScopeParams};
use crate::resolve::{self, days, ClarificationNeed, Resolution, ResolvedEntities};
use crate::scope::resolve_scope;
use crate::store::{DirectoryStore, EmployeeRecord, ThreadStore};
use crate::suggest::{SuggestionEngine, SuggestionRequest};
use crate::text::normalize;

/// Rows asked of `hours_top_n` when the message names no count.
const TOP_N_DEFAULT: u32 = 5;

/// Builds the classifier the config selects. Separate from [`Assistant::new`]
/// so binaries and tests can wire their own [`crate::classify::LlmClient`].
pub fn classifier_from_config(
    config: &AssistantConfig,
) -> Result<Arc<dyn IntentClassifier>, AssistantError> {
    match config.classifier {
        ClassifierMode::Rules => Ok(Arc::new(RuleClassifier::new())),
        ClassifierMode::Llm => {
            let client = HttpLlmClient::new(&config.llm).map_err(|err| {
                AssistantError::validation(format!("cannot build llm client: {err}"))
            })?;
            Ok(Arc::new(LlmClassifier::new(
                Arc::new(client),
                config.llm.clone(),
            )))
        }
    }
}

/// The assembled pipeline. One instance serves every thread; per-thread
/// state lives in the thread store.
pub struct Assistant {
    classifier: Arc<dyn IntentClassifier>,
    directory: Arc<dyn DirectoryStore>,
    threads: Arc<dyn ThreadStore>,
    executor: Arc<QueryExecutor>,
    suggestions: SuggestionEngine,
    config: AssistantConfig,
}

/// What the pending-clarification check decided for the incoming message.
enum PendingOutcome {
    /// The message answered the open question; run the restored intent.
    Resume(ExtractedIntent),
    /// The message did not answer it; ask again and keep waiting.
    Repeat(ClarificationRequest),
    /// Nothing was pending.
    None,
}

impl Assistant {
    /// Compiles the metric catalog and wires the pipeline. A malformed
    /// catalog template fails here, before the service takes traffic.
    pub fn new(
        config: AssistantConfig,
        classifier: Arc<dyn IntentClassifier>,
        directory: Arc<dyn DirectoryStore>,
        threads: Arc<dyn ThreadStore>,
        backend: Arc<dyn QueryBackend>,
    ) -> Result<Self, AssistantError> {
        let catalog = Arc::new(MetricCatalog::load()?);
        let executor = Arc::new(QueryExecutor::new(backend, catalog));
        let suggestions = SuggestionEngine::new(executor.clone());
        Ok(Assistant {
            classifier,
            directory,
            threads,
            executor,
            suggestions,
            config,
        })
    }

    /// Runs one full turn.
    pub async fn handle_query(&self, request: QueryRequest) -> Result<QueryReply, AssistantError> {
        let message = request.message.trim().to_owned();
        if message.is_empty() {
            return Err(AssistantError::validation_field(
                "message must not be empty",
                "message",
            ));
        }
        if request.manager_id.trim().is_empty() {
            return Err(AssistantError::validation_field(
                "manager_id must not be empty",
                "manager_id",
            ));
        }

        let mut context = self.load_or_create_thread(&request).await?;

        // Resolved before anything can answer, so the scope band is truthful
        // on every path, clarifications and errors included.
        let scope = resolve_scope(self.directory.as_ref(), &context).await?.scope;

        let question = match self.resume_pending(&mut context, &message) {
            PendingOutcome::Resume(question) => question,
            PendingOutcome::Repeat(repeat) => {
                return self
                    .finish_turn(context, ToolOutcome::Clarification(repeat), scope)
                    .await;
            }
            PendingOutcome::None => {
                let question = self.classifier.classify(&message).await;
                tracing::info!(
                    thread_id = %context.thread_id,
                    intent = question.intent.as_str(),
                    confidence = question.confidence.as_str(),
                    "message classified"
                );
                question
            }
        };

        if question.intent == Intent::ScopeChange {
            let outcome = self.apply_scope_change(&mut context, &question).await?;
            let band = match &outcome {
                ToolOutcome::ScopeChanged { scope, .. } => scope.clone(),
                _ => scope,
            };
            return self.finish_turn(context, outcome, band).await;
        }

        let employees = self.directory.employees_in_stores(&scope.store_ids).await?;
        let work_types = self
            .directory
            .work_types_in_stores(&scope.store_ids)
            .await?;

        let entities = match resolve::resolve_entities(
            &question,
            &scope,
            context.iso_week,
            &employees,
            &work_types,
            &context.state.known_mentions,
        ) {
            Resolution::Ready(entities) => entities,
            Resolution::Clarify(need) => {
                let ask = start_clarification(&mut context, need, &question);
                return self
                    .finish_turn(context, ToolOutcome::Clarification(ask), scope)
                    .await;
            }
        };
        if let Some((mention, id)) = &entities.remember_mention {
            context
                .state
                .known_mentions
                .insert(mention.clone(), id.clone());
        }

        let params = ScopeParams::new(scope.store_ids.clone(), entities.iso_week);
        let outcome = match self
            .route(&question, &entities, &params, &scope, &employees)
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(
                    thread_id = %context.thread_id,
                    intent = question.intent.as_str(),
                    error = %err,
                    "turn failed during routing"
                );
                ToolOutcome::Error(err.to_string())
            }
        };

        self.finish_turn(context, outcome, scope).await
    }

    /// Loads the thread named by the request or starts a fresh one. Request
    /// overrides pin context at creation; a live thread keeps what it has.
    async fn load_or_create_thread(
        &self,
        request: &QueryRequest,
    ) -> Result<ThreadContext, AssistantError> {
        if let Some(thread_id) = &request.thread_id {
            if let Some(context) = self.threads.load(thread_id).await? {
                if context.manager_id != request.manager_id {
                    return Err(AssistantError::validation_field(
                        "thread belongs to a different manager",
                        "thread_id",
                    ));
                }
                return Ok(context);
            }
        }

        let owned = self
            .directory
            .stores_for_manager(&request.manager_id)
            .await?;
        let overrides = request.overrides.clone().unwrap_or_default();

        let primary = match overrides.store_id {
            Some(store_id) => {
                if !owned.iter().any(|store| store.id == store_id) {
                    return Err(AssistantError::validation_field(
                        format!("store '{store_id}' is not managed by this manager"),
                        "store_id",
                    ));
                }
                store_id
            }
            None => owned.first().map(|store| store.id.clone()).ok_or_else(|| {
                AssistantError::validation_field("manager has no stores", "manager_id")
            })?,
        };

        let iso_week = match overrides.iso_week {
            Some(raw) => IsoWeek::from_str(&raw)
                .map_err(|err| AssistantError::validation_field(err.to_string(), "iso_week"))?,
            None => IsoWeek::current(),
        };

        let thread_id = request
            .thread_id
            .clone()
            .unwrap_or_else(|| Uuid::now_v7().to_string());
        let mut context = ThreadContext::new(
            thread_id,
            request.manager_id.clone(),
            primary,
            iso_week,
        );
        if let Some(mode) = overrides.scope {
            context.scope_mode = mode;
        }
        if let Some(extra) = overrides.extra_store_ids {
            context.extra_store_ids = extra;
        }
        tracing::info!(
            thread_id = %context.thread_id,
            manager_id = %context.manager_id,
            store_id = %context.primary_store_id,
            iso_week = %context.iso_week,
            "thread created"
        );
        Ok(context)
    }

    /// Tries to read the message as the answer to an open clarification.
    fn resume_pending(&self, context: &mut ThreadContext, message: &str) -> PendingOutcome {
        let Some(pending) = context.state.pending.clone() else {
            return PendingOutcome::None;
        };
        match pending {
            PendingClarification::EmployeeChoice {
                mention,
                options,
                question,
            } => {
                let folded = normalize(message);
                let picked = options.iter().find(|option| {
                    normalize(&option.label) == folded
                        || option.id.eq_ignore_ascii_case(message.trim())
                });
                match picked {
                    Some(option) => {
                        context.state.pending = None;
                        // Both the original mention and the picked label now
                        // resolve directly for the rest of the thread.
                        context
                            .state
                            .known_mentions
                            .insert(normalize(&mention), option.id.clone());
                        context
                            .state
                            .known_mentions
                            .insert(normalize(&option.label), option.id.clone());
                        let mut question = question;
                        question.employee_text = Some(option.label.clone());
                        PendingOutcome::Resume(question)
                    }
                    None => PendingOutcome::Repeat(ClarificationRequest {
                        kind: ClarificationKind::Employee,
                        message: format!("I still need to know which \"{mention}\" you mean."),
                        options,
                    }),
                }
            }
            PendingClarification::MissingDay { question } => {
                match days::parse_day_answer(message) {
                    Some(day) => {
                        context.state.pending = None;
                        let mut question = question;
                        question.day = Some(day);
                        PendingOutcome::Resume(question)
                    }
                    None => PendingOutcome::Repeat(ClarificationRequest {
                        kind: ClarificationKind::Day,
                        message: "Which day do you mean? A weekday name works, like Friday or vrijdag."
                            .to_owned(),
                        options: Vec::new(),
                    }),
                }
            }
        }
    }

    /// Applies an explicit scope-change message. Ownership is re-read every
    /// time so the acknowledgement reflects what the manager can see now.
    async fn apply_scope_change(
        &self,
        context: &mut ThreadContext,
        question: &ExtractedIntent,
    ) -> Result<ToolOutcome, AssistantError> {
        let Some(mode) = question.scope_mode else {
            return Ok(ToolOutcome::Clarification(ClarificationRequest {
                kind: ClarificationKind::Question,
                message: "Do you want this store only, or all your stores?".to_owned(),
                options: Vec::new(),
            }));
        };

        let owned = self
            .directory
            .stores_for_manager(&context.manager_id)
            .await?;
        context.scope_mode = mode;
        context.extra_store_ids.clear();
        context
            .state
            .notes
            .push(format!("scope set to {}", mode.as_str()));

        let scope = match mode {
            ScopeMode::HomeOnly => {
                ResolvedScope::single_store(context.primary_store_id.clone(), mode)
            }
            _ => {
                let mut store_ids = vec![context.primary_store_id.clone()];
                store_ids.extend(
                    owned
                        .iter()
                        .filter(|store| store.id != context.primary_store_id)
                        .map(|store| store.id.clone()),
                );
                ResolvedScope {
                    primary_store_id: context.primary_store_id.clone(),
                    mode,
                    store_ids,
                }
            }
        };
        tracing::info!(
            thread_id = %context.thread_id,
            mode = mode.as_str(),
            stores = scope.store_ids.len(),
            "scope changed"
        );
        Ok(ToolOutcome::ScopeChanged {
            scope,
            sources: vec![SourceRead::weekless("store_directory", owned.len())],
        })
    }

    /// Maps a resolved question onto the tool that can answer it.
    async fn route(
        &self,
        question: &ExtractedIntent,
        entities: &ResolvedEntities,
        params: &ScopeParams,
        scope: &ResolvedScope,
        employees: &[EmployeeRecord],
    ) -> Result<ToolOutcome, AssistantError> {
        match question.intent {
            Intent::HoursForEmployee => {
                self.metric_outcome("hours_for_employee", employee_params(entities)?, params)
                    .await
            }
            Intent::HoursTopN => {
                let mut values = BTreeMap::new();
                let limit = i64::from(question.top_n.unwrap_or(TOP_N_DEFAULT));
                values.insert("limit".to_owned(), ParamValue::Int(limit));
                self.metric_outcome("hours_top_n", values, params).await
            }
            Intent::HoursUnderTarget => {
                self.metric_outcome("hours_under_target", BTreeMap::new(), params)
                    .await
            }
            Intent::HoursOverTarget => {
                self.metric_outcome("hours_over_target", BTreeMap::new(), params)
                    .await
            }
            Intent::AvailabilityOnDay => {
                let mut values = day_params(entities)?;
                if let Some(window) = entities.window {
                    values.insert(
                        "window_start".to_owned(),
                        ParamValue::Int(i64::from(window.start_minute)),
                    );
                    values.insert(
                        "window_end".to_owned(),
                        ParamValue::Int(i64::from(window.end_minute)),
                    );
                }
                self.metric_outcome("availability_on_day", values, params)
                    .await
            }
            Intent::AvailabilityForEmployee => {
                self.metric_outcome(
                    "availability_for_employee",
                    employee_params(entities)?,
                    params,
                )
                .await
            }
            Intent::ScheduleForEmployee => {
                self.metric_outcome("schedule_for_employee", employee_params(entities)?, params)
                    .await
            }
            Intent::WhoWorksOnDay => {
                let mut values = day_params(entities)?;
                if let Some(work_type) = &entities.work_type {
                    values.insert(
                        "work_type".to_owned(),
                        ParamValue::Text(work_type.filter_text().to_owned()),
                    );
                }
                self.metric_outcome("who_works_on_day", values, params).await
            }
            Intent::CoverageGaps => {
                let mut values = BTreeMap::new();
                if let Some(day) = entities.day {
                    values.insert("day".to_owned(), ParamValue::Day(day));
                }
                self.metric_outcome("coverage_gaps", values, params).await
            }
            Intent::BiggestGap => self.adhoc_outcome(AdHocQuery::biggest_gap(), params).await,
            Intent::CompareWeeks => {
                let anchor = entities.iso_week;
                self.adhoc_outcome(AdHocQuery::compare_weeks(anchor, anchor.shift(-1)), params)
                    .await
            }
            Intent::SuggestCoverage => {
                let day = entities.day.ok_or_else(|| {
                    AssistantError::validation("no day resolved for a coverage suggestion")
                })?;
                let request = SuggestionRequest {
                    day,
                    window: entities.window,
                    work_type: entities.work_type.clone(),
                    limit: question
                        .top_n
                        .map(|n| n as usize)
                        .unwrap_or(self.config.suggestion_limit),
                };
                let (candidates, sources) = self
                    .suggestions
                    .suggest(&request, employees, params, &scope.primary_store_id)
                    .await?;
                Ok(ToolOutcome::Suggestions {
                    day,
                    window: request.window,
                    work_type: entities
                        .work_type
                        .as_ref()
                        .map(|wt| wt.filter_text().to_string()),
                    candidates,
                    sources,
                })
            }
            // Scope changes are intercepted before routing; Clarify carries
            // a fragment no pending question absorbed.
            Intent::ScopeChange | Intent::Clarify | Intent::Unknown => {
                Ok(ToolOutcome::Clarification(ClarificationRequest {
                    kind: ClarificationKind::Question,
                    message: "I did not catch that. Ask about hours, availability, schedules, \
                              gaps or suggestions."
                        .to_owned(),
                    options: Vec::new(),
                }))
            }
        }
    }

    async fn metric_outcome(
        &self,
        name: &str,
        values: BTreeMap<String, ParamValue>,
        params: &ScopeParams,
    ) -> Result<ToolOutcome, AssistantError> {
        let output = self.executor.run_metric(name, values, params).await?;
        Ok(ToolOutcome::Metric {
            metric: name.to_owned(),
            rows: output.rows,
            sources: vec![output.source],
        })
    }

    async fn adhoc_outcome(
        &self,
        query: AdHocQuery,
        params: &ScopeParams,
    ) -> Result<ToolOutcome, AssistantError> {
        let name = query.name;
        let output = self.executor.run_adhoc(query, params).await?;
        Ok(ToolOutcome::AdHoc {
            name: name.to_owned(),
            rows: output.rows,
            sources: vec![output.source],
        })
    }

    /// Applies the fail-closed read check, renders the reply, persists the
    /// thread and shapes the wire response. A failed save is logged and
    /// swallowed; the manager still gets their answer.
    async fn finish_turn(
        &self,
        context: ThreadContext,
        outcome: ToolOutcome,
        scope: ResolvedScope,
    ) -> Result<QueryReply, AssistantError> {
        let outcome = match enforce_data_backing(&outcome) {
            Ok(()) => outcome,
            Err(err) => ToolOutcome::Error(err.to_string()),
        };

        let needs_clarification = match &outcome {
            ToolOutcome::Clarification(request) => Some(request.clone()),
            _ => None,
        };
        let error = match &outcome {
            ToolOutcome::Error(_) => Some("internal".to_owned()),
            _ => None,
        };
        let text = format::render_reply(&outcome, &scope);
        let sources = outcome.sources().iter().map(SourceRead::render).collect();

        if let Err(err) = self.threads.save(&context).await {
            tracing::error!(
                thread_id = %context.thread_id,
                error = %err,
                "thread save failed"
            );
        }

        Ok(QueryReply {
            text,
            sources,
            thread_id: context.thread_id,
            needs_clarification,
            error,
        })
    }
}

/// Converts a resolver clarification into a wire request, parking the turn's
/// question when a follow-up answer can complete it.
fn start_clarification(
    context: &mut ThreadContext,
    need: ClarificationNeed,
    question: &ExtractedIntent,
) -> ClarificationRequest {
    match need {
        ClarificationNeed::EmployeeAmbiguous { mention, options } => {
            context.state.pending = Some(PendingClarification::EmployeeChoice {
                mention: mention.clone(),
                options: options.clone(),
                question: question.clone(),
            });
            ClarificationRequest {
                kind: ClarificationKind::Employee,
                message: format!("I found more than one \"{mention}\". Which one do you mean?"),
                options,
            }
        }
        ClarificationNeed::EmployeeUnknown { mention } => {
            // No pending state: a name that matched nobody is more often a
            // typo than an answerable follow-up.
            let message = if mention.is_empty() {
                "Who do you mean? Give me a name.".to_owned()
            } else {
                format!("I could not find anyone called \"{mention}\" in the current scope.")
            };
            ClarificationRequest {
                kind: ClarificationKind::Employee,
                message,
                options: Vec::new(),
            }
        }
        ClarificationNeed::DayMissing => {
            context.state.pending = Some(PendingClarification::MissingDay {
                question: question.clone(),
            });
            ClarificationRequest {
                kind: ClarificationKind::Day,
                message: "Which day should I look at?".to_owned(),
                options: Vec::new(),
            }
        }
    }
}

fn employee_params(
    entities: &ResolvedEntities,
) -> Result<BTreeMap<String, ParamValue>, AssistantError> {
    let employee_id = entities.employee_id.clone().ok_or_else(|| {
        AssistantError::validation("no employee resolved for an employee metric")
    })?;
    let mut values = BTreeMap::new();
    values.insert("employee_id".to_owned(), ParamValue::Text(employee_id));
    Ok(values)
}

fn day_params(
    entities: &ResolvedEntities,
) -> Result<BTreeMap<String, ParamValue>, AssistantError> {
    let day = entities
        .day
        .ok_or_else(|| AssistantError::validation("no day resolved for a day metric"))?;
    let mut values = BTreeMap::new();
    values.insert("day".to_owned(), ParamValue::Day(day));
    Ok(values)
}
