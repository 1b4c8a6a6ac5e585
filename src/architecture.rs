/// The following diagram shows how a single run flows through the crate and which external
/// systems it touches.
#[cfg_attr(doc, aquamarine::aquamarine)]
/// ```mermaid
/// graph LR
///     subgraph Caller
///         cli[CLI / UI]
///         task[task::submit]
///     end
///     cli-- DiagramRequest --> task
///     task-- run_to_outcome --> orchestrator
///     subgraph Flowchart Weaver
///         orchestrator[Orchestrator]
///         prompt[build_prompt]
///         sanitize[sanitize]
///         renderer[Renderer]
///         llm>Llm]
///         orchestrator-- description --> prompt
///         orchestrator-- system + prompt --> llm
///         orchestrator-- raw reply --> sanitize
///         orchestrator-- diagram text --> renderer
///     end
///     llm-. impl .- chat[ChatCompletionLlm]
///     chat-- HTTPS --> api[(OpenAI-compatible API)]
///     renderer-- transient .mmd --> mmdc[[mmdc]]
///     mmdc-- flowchart.png/svg/pdf --> fs[(output directory)]
///     task-. RenderOutcome .-> cli
/// ```
///
/// [`Orchestrator`](crate::Orchestrator) owns one [`Llm`](crate::Llm) and one
/// [`Renderer`](crate::Renderer). Swapping the [`Llm`](crate::Llm) implementation is how a
/// different provider, or a test double, is plugged in.
///
/// Renderer presence is checked before the model is called. Every run writes its own transient
/// `.mmd` file and removes it afterwards, so concurrent runs submitted through
/// [`task`](crate::task) never see each other's input.
pub struct Diagram;
