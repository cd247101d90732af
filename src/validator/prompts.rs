use serde_json;

use crate::spec::LaptopSpec;

/// Return a compact text version of the verdict schema for embedding in
/// prompts. Used by providers running in plain JSON mode.
pub fn verdict_schema_text() -> String {
    let schema = verdict_json_schema();
    serde_json::to_string_pretty(&schema).unwrap_or_else(|_| "{}".to_string())
}

/// Return the JSON schema for the validation verdict.
/// Used with LLM structured output APIs to guarantee valid JSON conforming
/// to the ValidationVerdict shape.
pub fn verdict_json_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "isValid": {
                "type": "boolean",
                "description": "Whether the laptop specification is plausible and free of contradictions."
            },
            "reason": {
                "type": ["string", "null"],
                "description": "Why the specification is implausible. null when isValid is true."
            }
        },
        "required": ["isValid", "reason"],
        "additionalProperties": false
    })
}

/// Build the plausibility-check prompt for the LLM.
/// Every field of the specification is embedded, followed by the heuristics
/// the model is asked to apply. The heuristics are policy, not hard rules:
/// the model weighs them, it does not execute them.
pub fn build_validation_prompt(spec: &LaptopSpec) -> String {
    let schema = verdict_schema_text();
    format!(
        r#"You are an expert in laptop hardware. Review the laptop specification below and decide whether the combination of values is plausible and free of contradictions.

SPECIFICATION:
- Company: {company}
- Type Name: {type_name}
- OS: {os}
- Screen Resolution: {screen_resolution}
- IPS Panel: {ips_panel}
- Touchscreen: {touchscreen}
- Weight: {weight} kg
- Screen Size: {inches} inches
- RAM: {ram} GB
- CPU Category: {cpu_category}
- CPU Speed: {cpu_speed_ghz} GHz
- GPU Category: {gpu_category}
- SSD: {ssd} GB
- HDD: {hdd} GB
- Flash Storage: {flash} GB
- Hybrid Storage: {hybrid} GB

Consider typical combinations and constraints. For example:
- A brand's laptops cannot ship a competitor's operating system (an Apple laptop cannot run Windows).
- A very light laptop is unlikely to carry a high-end discrete GPU (a 0.5 kg laptop with an "Nvidia High-End" GPU is implausible).
- The screen size should fit the laptop type (a 10-inch screen is not typical for a "Gaming" type).
- Entry-level CPUs are not paired with workstation-class RAM (an "Intel Celeron" with 64 GB RAM is implausible).
- Flag extremely low or high values for weight, RAM, storage, or CPU speed relative to the other specs.

If the specification is implausible, set isValid to false and explain in the reason field. If it is plausible, set isValid to true and set reason to null.

Return a JSON object matching this schema:
{schema}"#,
        company = spec.company,
        type_name = spec.type_name,
        os = spec.os,
        screen_resolution = spec.screen_resolution,
        ips_panel = spec.ips_panel,
        touchscreen = spec.touchscreen,
        weight = spec.weight,
        inches = spec.inches,
        ram = spec.ram,
        cpu_category = spec.cpu_category,
        cpu_speed_ghz = spec.cpu_speed_ghz,
        gpu_category = spec.gpu_category,
        ssd = spec.ssd,
        hdd = spec.hdd,
        flash = spec.flash,
        hybrid = spec.hybrid,
    )
}
