//! Sample summaries for testing and demonstration.
//!
//! Each sample exercises a different mix of the supported markup.

/// Short summary: one heading, emphasis, and a short list.
pub fn short_summary() -> &'static str {
    r##"# Overview
The video walks through **three habits** that make code review *faster*.

- Keep changes small
- Write the description first
- Review your own diff before asking
"##
}

/// Medium summary with several heading levels, as a summarizer would return
/// it for a lecture.
pub fn lecture_summary() -> &'static str {
    r##"# Introduction
The lecturer opens with a question: *why do bridges sway?* The answer, she
argues, lies in **resonance** rather than raw load.

## Main Points
### Resonance
Every structure has natural frequencies. When a periodic force such as
marching soldiers or gusting wind matches one of them, small pushes add up.

- **Tacoma Narrows (1940):** aeroelastic flutter, not simple resonance
- **Millennium Bridge (2000):** pedestrians fell into step with the sway
- Dampers and tuned masses shift or absorb the energy

### Design Responses
Engineers now model crowd behaviour explicitly and add *viscous dampers* where
retrofits are cheaper than rebuilding.

## Conclusion
Understanding the **feedback between people and structures** turned a
curiosity into a design requirement.
"##
}

/// Summary wrapped the way some models reply: a code fence and escaped
/// newlines.
pub fn fenced_summary() -> &'static str {
    "```markdown\n# Key Points\\n- First **finding**\\n- Second *finding*\n```"
}

/// Summary mixing every edge the classifier has to handle.
pub fn edge_case_summary() -> &'static str {
    r##"####### Deeply nested heading
#hashtag is not a heading
* star bullet with **bold**
-dash without space is text

2 * 3 * 4 stays arithmetic, **unclosed bold stays literal
"##
}

/// A long summary that needs several content pages.
pub fn long_summary(sections: usize) -> String {
    let mut out = String::new();
    for i in 1..=sections {
        out.push_str(&format!("## Section {i}\n"));
        out.push_str(
            "This section restates the speaker's argument in detail, with **key terms** \
             highlighted and *asides* kept in italics so that the page fills with \
             realistic paragraph text of varying line lengths.\n",
        );
        out.push_str("- A supporting example\n- A counterpoint raised by the audience\n\n");
    }
    out
}
