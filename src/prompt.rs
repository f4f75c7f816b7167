//! Avatar prompt templating.
//!
//! A template is parsed once into literal segments and placeholder slots. Rendering walks the
//! segments and inserts values verbatim, so text supplied by the user is never rescanned for
//! placeholders and every slot in the template is always filled.

use crate::error::{AvatarError, Result};

/// Rendered in place of the username in the variant without one.
pub const NO_USERNAME: &str = "No username in this version.";

/// Used when no text language was selected.
pub const DEFAULT_LANGUAGE: &str = "English";

pub const AVATAR_TEMPLATE: &str = r#"
# User Avatar Creation Master

Create an avatar for the user: {{USER_NAME}}
It needs to be a png image 800x800 pixels with {{DARK_LIGHT}} colors and {{IDEAS_THEMES_IMAGERY}} ideas, themes, and imagery.
The user intends to use this avatar on a cyber security forum with primarily Eastern European members.

The image you design is going to be the 'face' of this user on the forum, the image shown on every post, message, and comment on the forum. It should be simple, interesting, unique, and similar to other avatars on similar forums and message groups.

## !! IMPORTANT RULES !!
- Examples may be provided for you as attachments. These examples are to give you an idea of the avatars in-use by other users of the same forum. It's okay to use the examples as a guide or for general ideas of popular themes among that user-base, but the avatars generated should be unique and MUST ALWAYS reflect the users requests for theme,colors,ideas,imagery,and username and if possible conform to forum 'norms'.
- Two images will be generated for every request, one with USER_NAME in avatar and one without USER_NAME.
- Use information like: The type of community the avatar is for, the language spoken by users, themes popular among users of similar groups and websites.
- If you're able to search the internet, or use any external tools you have full permission to do anything necessary and use any data you seem fit.
- If any text is included, such as the username, please use characters appropriate for the following languages: {{TEXT_LANGUAGES}}.

EXAMPLE INPUT:
USER_NAME="{{USER_NAME_INPUT}}"
DARK_LIGHT="{{DARK_LIGHT}}"
IDEAS_THEMES_IMAGERY="{{IDEAS_THEMES_IMAGERY}}"
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    UserName,
    UserNameInput,
    DarkLight,
    Ideas,
    TextLanguages,
}

impl Placeholder {
    pub const ALL: [Placeholder; 5] = [
        Placeholder::UserName,
        Placeholder::UserNameInput,
        Placeholder::DarkLight,
        Placeholder::Ideas,
        Placeholder::TextLanguages,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Placeholder::UserName => "USER_NAME",
            Placeholder::UserNameInput => "USER_NAME_INPUT",
            Placeholder::DarkLight => "DARK_LIGHT",
            Placeholder::Ideas => "IDEAS_THEMES_IMAGERY",
            Placeholder::TextLanguages => "TEXT_LANGUAGES",
        }
    }

    pub fn token(&self) -> String {
        format!("{{{{{}}}}}", self.name())
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slot(Placeholder),
}

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    segments: Vec<Segment>,
}

/// Values for one rendering.
#[derive(Debug, Clone, Copy)]
pub struct PromptValues<'a> {
    pub user_name: &'a str,
    pub user_name_input: &'a str,
    pub dark_light: &'a str,
    pub ideas: &'a str,
    pub text_languages: &'a str,
}

impl PromptValues<'_> {
    fn get(&self, placeholder: Placeholder) -> &str {
        match placeholder {
            Placeholder::UserName => self.user_name,
            Placeholder::UserNameInput => self.user_name_input,
            Placeholder::DarkLight => self.dark_light,
            Placeholder::Ideas => self.ideas,
            Placeholder::TextLanguages => self.text_languages,
        }
    }
}

/// The two prompt variants of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub with_username: String,
    pub without_username: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            segments: split_segments(AVATAR_TEMPLATE)
                .into_iter()
                .map(|(segment, _)| segment)
                .collect(),
        }
    }
}

impl PromptTemplate {
    /// Parses a custom template. Any `{{NAME}}` token that is not a known placeholder is rejected.
    pub fn parse(template: &str) -> Result<Self> {
        let mut segments = Vec::new();
        for (segment, unknown) in split_segments(template) {
            if let Some(name) = unknown {
                return Err(AvatarError::ValidationError(format!(
                    "Unknown placeholder {{{{{}}}}} in prompt template",
                    name
                )));
            }
            segments.push(segment);
        }
        Ok(Self { segments })
    }

    pub fn placeholders(&self) -> impl Iterator<Item = Placeholder> + '_ {
        self.segments.iter().filter_map(|s| match s {
            Segment::Slot(p) => Some(*p),
            Segment::Literal(_) => None,
        })
    }

    pub fn render(&self, values: &PromptValues<'_>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Slot(placeholder) => out.push_str(values.get(*placeholder)),
            }
        }
        out
    }

    /// Renders the with-username and without-username variants.
    pub fn render_pair(
        &self,
        user_name: &str,
        dark_light: &str,
        ideas: &str,
        text_languages: &[String],
    ) -> PromptPair {
        let languages = join_languages(text_languages);
        let quoted = format!("\"{}\"", user_name);

        let with_username = self.render(&PromptValues {
            user_name: &quoted,
            user_name_input: user_name,
            dark_light,
            ideas,
            text_languages: &languages,
        });
        let without_username = self.render(&PromptValues {
            user_name: NO_USERNAME,
            user_name_input: NO_USERNAME,
            dark_light,
            ideas,
            text_languages: &languages,
        });

        PromptPair {
            with_username,
            without_username,
        }
    }
}

/// Joins languages with ", ", dropping blanks and repeats; `English` when nothing is left.
pub fn join_languages(languages: &[String]) -> String {
    let mut seen: Vec<&str> = Vec::new();
    for lang in languages.iter().map(|l| l.trim()).filter(|l| !l.is_empty()) {
        if !seen.contains(&lang) {
            seen.push(lang);
        }
    }

    if seen.is_empty() {
        DEFAULT_LANGUAGE.to_string()
    } else {
        seen.join(", ")
    }
}

/// Splits a template into segments. Unknown `{{NAME}}` tokens stay literal and are reported
/// alongside their segment.
fn split_segments(template: &str) -> Vec<(Segment, Option<String>)> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        literal.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];

        let Some(end) = after_open.find("}}") else {
            literal.push_str(&rest[start..]);
            rest = "";
            break;
        };

        let name = &after_open[..end];
        match Placeholder::from_name(name) {
            Some(placeholder) => {
                if !literal.is_empty() {
                    segments.push((Segment::Literal(std::mem::take(&mut literal)), None));
                }
                segments.push((Segment::Slot(placeholder), None));
            }
            None if is_token_name(name) => {
                literal.push_str(&rest[start..start + 2 + end + 2]);
                segments.push((
                    Segment::Literal(std::mem::take(&mut literal)),
                    Some(name.to_string()),
                ));
            }
            None => {
                // Step past one brace so a `{{` nested inside is still found.
                literal.push('{');
                rest = &rest[start + 1..];
                continue;
            }
        }
        rest = &after_open[end + 2..];
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push((Segment::Literal(literal), None));
    }
    segments
}

fn is_token_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn langs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn assert_no_placeholders(text: &str) {
        for placeholder in Placeholder::ALL {
            assert!(
                !text.contains(&placeholder.token()),
                "unresolved {} in:\n{}",
                placeholder.token(),
                text
            );
        }
    }

    #[test]
    fn test_default_template_uses_every_placeholder() {
        let template = PromptTemplate::default();
        let used: Vec<Placeholder> = template.placeholders().collect();
        for placeholder in Placeholder::ALL {
            assert!(used.contains(&placeholder), "{:?} missing", placeholder);
        }
        // DARK_LIGHT and IDEAS appear twice each
        assert_eq!(
            used.iter().filter(|p| **p == Placeholder::DarkLight).count(),
            2
        );
    }

    #[test]
    fn test_render_pair_properties() {
        let template = PromptTemplate::default();
        let user_names = ["cheevh", "Zx9_q", "ночь", "user name", "x"];
        let styles = ["dark, minimal", "", "light pastel"];
        let ideas = ["electronics, networking, reverse shells, #!", "", "cats"];
        let language_sets = [langs(&[]), langs(&["en"]), langs(&["en", "ru", "ch"])];

        for user_name in user_names {
            for style in styles {
                for idea in ideas {
                    for languages in &language_sets {
                        let pair = template.render_pair(user_name, style, idea, languages);

                        assert_no_placeholders(&pair.with_username);
                        assert_no_placeholders(&pair.without_username);
                        assert!(pair
                            .with_username
                            .contains(&format!("user: \"{}\"", user_name)));
                        assert!(!pair
                            .without_username
                            .contains(&format!("\"{}\"", user_name)));
                        assert!(pair.without_username.contains(NO_USERNAME));
                        assert_eq!(
                            pair,
                            template.render_pair(user_name, style, idea, languages)
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_without_username_never_contains_name() {
        let template = PromptTemplate::default();
        let pair = template.render_pair("cheevh", "dark, minimal", "electronics", &langs(&["en"]));
        assert!(pair.with_username.contains("cheevh"));
        assert!(!pair.without_username.contains("cheevh"));
        assert!(pair
            .without_username
            .contains(&format!("USER_NAME=\"{}\"", NO_USERNAME)));
    }

    #[test]
    fn test_values_are_inserted_literally() {
        let template = PromptTemplate::default();
        let pair = template.render_pair("{{DARK_LIGHT}}", "dark", "{{ not a token", &[]);
        assert!(pair.with_username.contains("user: \"{{DARK_LIGHT}}\""));
        assert!(pair.with_username.contains("with dark colors and {{ not a token ideas"));
    }

    #[test]
    fn test_languages() {
        assert_eq!(join_languages(&[]), "English");
        assert_eq!(join_languages(&langs(&["  ", ""])), "English");
        assert_eq!(join_languages(&langs(&["en", "ru", "en", " ch "])), "en, ru, ch");

        let pair = PromptTemplate::default().render_pair("a", "b", "c", &[]);
        assert!(pair
            .with_username
            .contains("the following languages: English."));
    }

    #[test]
    fn test_parse_custom_template() {
        let template = PromptTemplate::parse("Avatar for {{USER_NAME}} in {{TEXT_LANGUAGES}} {{ }}").unwrap();
        let pair = template.render_pair("neo", "", "", &langs(&["ru"]));
        assert_eq!(pair.with_username, "Avatar for \"neo\" in ru {{ }}");
        assert_eq!(
            pair.without_username,
            format!("Avatar for {} in ru {{{{ }}}}", NO_USERNAME)
        );

        let err = PromptTemplate::parse("Hello {{NICKNAME}}").unwrap_err();
        assert!(matches!(err, AvatarError::ValidationError(_)));
    }

    #[test]
    fn test_extra_braces_around_placeholders() {
        let template = PromptTemplate::parse("Hi {{{USER_NAME}}} and {{{{DARK_LIGHT}}").unwrap();
        assert_eq!(template.placeholders().count(), 2);

        let pair = template.render_pair("neo", "dark", "", &[]);
        assert_eq!(pair.with_username, "Hi {\"neo\"} and {{dark");
        assert_eq!(pair.without_username, format!("Hi {{{}}} and {{{{dark", NO_USERNAME));
        for text in [&pair.with_username, &pair.without_username] {
            assert!(!text.contains("{{USER_NAME}}"));
            assert!(!text.contains("{{DARK_LIGHT}}"));
        }

        assert!(PromptTemplate::parse("{{{NICKNAME}}}").is_err());
    }

    #[test]
    fn test_unterminated_brace_is_literal() {
        let template = PromptTemplate::parse("{{USER_NAME}} and {{DARK").unwrap();
        let pair = template.render_pair("n", "", "", &[]);
        assert_eq!(pair.with_username, "\"n\" and {{DARK");
    }
}
