//! 名稱格式模板
//!
//! 支援 Python `str.format` 的關鍵字替換子集：
//! `{欄位}`、`{欄位!s}`、`{欄位!r}`、`{欄位:規格}`，以及 `{{` / `}}` 跳脫。
//! 規格語法為 `[[fill]align][sign][#][0][width][grouping][.precision][type]`。
//!
//! 只接受欄位名稱；位置參數、屬性存取（`{a.b}`）與索引存取（`{a[0]}`）一律拒絕。

use std::fmt;
use std::str::FromStr;

use stockloc_core::{FieldSnapshot, FieldValue, LocationError, Result};

/// 已解析的名稱格式
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTemplate {
    source: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(FieldRef),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldRef {
    name: String,
    conversion: Option<Conversion>,
    spec_source: String,
    spec: FormatSpec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conversion {
    Str,
    Repr,
    Ascii,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
    Center,
    AfterSign,
}

impl Align {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '<' => Some(Align::Left),
            '>' => Some(Align::Right),
            '^' => Some(Align::Center),
            '=' => Some(Align::AfterSign),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sign {
    Plus,
    Minus,
    Space,
}

impl Sign {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Sign::Plus),
            '-' => Some(Sign::Minus),
            ' ' => Some(Sign::Space),
            _ => None,
        }
    }
}

/// 格式規格
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct FormatSpec {
    fill: Option<char>,
    align: Option<Align>,
    sign: Option<Sign>,
    alternate: bool,
    zero: bool,
    width: Option<usize>,
    grouping: Option<char>,
    precision: Option<usize>,
    kind: Option<char>,
}

const FORMAT_TYPES: &str = "sdnboxXcfF%";

/// 寬度與精度的上限
const MAX_SPEC_NUMBER: usize = 1024;

fn spec_number(digits: &[char], what: &str) -> std::result::Result<usize, String> {
    let text: String = digits.iter().collect();
    match text.parse::<usize>() {
        Ok(number) if number <= MAX_SPEC_NUMBER => Ok(number),
        _ => Err(format!("{}超過上限 {}", what, MAX_SPEC_NUMBER)),
    }
}

impl NameTemplate {
    /// 解析名稱格式
    pub fn parse(template: &str) -> Result<Self> {
        let syntax = |reason: &str| LocationError::TemplateSyntax {
            template: template.to_string(),
            reason: reason.to_string(),
        };

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' => {
                    if chars.peek() == Some(&'{') {
                        chars.next();
                        literal.push('{');
                        continue;
                    }

                    let mut body = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        match c {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => return Err(syntax("不支援巢狀替換欄位")),
                            _ => body.push(c),
                        }
                    }
                    if !closed {
                        return Err(syntax("缺少對應的 '}'"));
                    }

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(Self::parse_field(template, &body)?));
                }
                '}' => {
                    if chars.peek() == Some(&'}') {
                        chars.next();
                        literal.push('}');
                    } else {
                        return Err(syntax("出現單獨的 '}'"));
                    }
                }
                _ => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: template.to_string(),
            segments,
        })
    }

    fn parse_field(template: &str, body: &str) -> Result<FieldRef> {
        let syntax = |reason: String| LocationError::TemplateSyntax {
            template: template.to_string(),
            reason,
        };

        let (head, spec_source) = match body.find(':') {
            Some(i) => (&body[..i], &body[i + 1..]),
            None => (body, ""),
        };
        let (name, conversion) = match head.find('!') {
            Some(i) => (&head[..i], Some(&head[i + 1..])),
            None => (head, None),
        };

        if name.is_empty() || name.chars().all(|c| c.is_ascii_digit()) {
            return Err(syntax("只支援以欄位名稱替換，不支援位置參數".to_string()));
        }
        if name.contains('.') || name.contains('[') || name.contains(']') {
            return Err(syntax(format!("不支援屬性或索引存取: {}", name)));
        }

        let conversion = match conversion {
            None => None,
            Some("s") => Some(Conversion::Str),
            Some("r") => Some(Conversion::Repr),
            Some("a") => Some(Conversion::Ascii),
            Some(other) => return Err(syntax(format!("未知的轉換: !{}", other))),
        };

        let spec = FormatSpec::parse(spec_source).map_err(|reason| LocationError::TemplateFormat {
            field: name.to_string(),
            spec: spec_source.to_string(),
            reason,
        })?;

        Ok(FieldRef {
            name: name.to_string(),
            conversion,
            spec_source: spec_source.to_string(),
            spec,
        })
    }

    /// 原始格式字串
    pub fn source(&self) -> &str {
        &self.source
    }

    /// 模板引用的欄位名稱（依出現順序，可能重複）
    pub fn fields(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Field(field) => Some(field.name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// 以欄位快照渲染
    pub fn render(&self, snapshot: &FieldSnapshot) -> Result<String> {
        let mut output = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Field(field) => {
                    let value =
                        snapshot
                            .get(&field.name)
                            .ok_or_else(|| LocationError::TemplateField {
                                field: field.name.clone(),
                            })?;
                    output.push_str(&field.format(value)?);
                }
            }
        }
        Ok(output)
    }
}

impl FromStr for NameTemplate {
    type Err = LocationError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for NameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FieldRef {
    fn format(&self, value: &FieldValue) -> Result<String> {
        let converted = match self.conversion {
            None => None,
            Some(Conversion::Str) => Some(value.to_string()),
            Some(Conversion::Repr) => Some(repr(value, false)),
            Some(Conversion::Ascii) => Some(repr(value, true)),
        };

        let formatted = match (converted, value) {
            (Some(text), _) => self.spec.format_text(&text),
            (None, FieldValue::Text(text)) => self.spec.format_text(text),
            (None, FieldValue::Integer(number)) => self.spec.format_integer(*number),
        };

        formatted.map_err(|reason| LocationError::TemplateFormat {
            field: self.name.clone(),
            spec: self.spec_source.clone(),
            reason,
        })
    }
}

/// `repr()` / `ascii()` 表示法
fn repr(value: &FieldValue, ascii_only: bool) -> String {
    let text = match value {
        FieldValue::Integer(number) => return number.to_string(),
        FieldValue::Text(text) => text,
    };

    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if ascii_only && !c.is_ascii() => {
                let code = c as u32;
                if code <= 0xff {
                    out.push_str(&format!("\\x{:02x}", code));
                } else if code <= 0xffff {
                    out.push_str(&format!("\\u{:04x}", code));
                } else {
                    out.push_str(&format!("\\U{:08x}", code));
                }
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

impl FormatSpec {
    fn parse(spec: &str) -> std::result::Result<Self, String> {
        let chars: Vec<char> = spec.chars().collect();
        let mut parsed = FormatSpec::default();
        let mut i = 0;

        if let Some(align) = chars.get(1).and_then(|c| Align::from_char(*c)) {
            parsed.fill = Some(chars[0]);
            parsed.align = Some(align);
            i = 2;
        } else if let Some(align) = chars.first().and_then(|c| Align::from_char(*c)) {
            parsed.align = Some(align);
            i = 1;
        }

        if let Some(sign) = chars.get(i).and_then(|c| Sign::from_char(*c)) {
            parsed.sign = Some(sign);
            i += 1;
        }
        if chars.get(i) == Some(&'#') {
            parsed.alternate = true;
            i += 1;
        }
        if chars.get(i) == Some(&'0') {
            parsed.zero = true;
            i += 1;
        }

        let start = i;
        while chars.get(i).map_or(false, |c| c.is_ascii_digit()) {
            i += 1;
        }
        if i > start {
            parsed.width = Some(spec_number(&chars[start..i], "寬度")?);
        }

        if let Some(&c) = chars.get(i) {
            if c == ',' || c == '_' {
                parsed.grouping = Some(c);
                i += 1;
            }
        }

        if chars.get(i) == Some(&'.') {
            i += 1;
            let start = i;
            while chars.get(i).map_or(false, |c| c.is_ascii_digit()) {
                i += 1;
            }
            if i == start {
                return Err("缺少精度".to_string());
            }
            parsed.precision = Some(spec_number(&chars[start..i], "精度")?);
        }

        if let Some(&c) = chars.get(i) {
            if !FORMAT_TYPES.contains(c) {
                return Err(format!("未知的格式類型 '{}'", c));
            }
            parsed.kind = Some(c);
            i += 1;
        }

        if i < chars.len() {
            return Err("無效的格式規格".to_string());
        }

        Ok(parsed)
    }

    fn format_text(&self, text: &str) -> std::result::Result<String, String> {
        if self.sign.is_some() {
            return Err("文字格式不允許正負號".to_string());
        }
        if self.alternate {
            return Err("文字格式不允許 '#'".to_string());
        }
        if self.grouping.is_some() {
            return Err("文字格式不允許千分位".to_string());
        }
        if self.align == Some(Align::AfterSign) {
            return Err("文字格式不允許 '=' 對齊".to_string());
        }
        if let Some(kind) = self.kind.filter(|k| *k != 's') {
            return Err(format!("文字值無法使用格式類型 '{}'", kind));
        }

        let text: String = match self.precision {
            Some(precision) => text.chars().take(precision).collect(),
            None => text.to_string(),
        };
        let fill = self
            .fill
            .unwrap_or(if self.zero { '0' } else { ' ' });
        Ok(pad(&text, self.width, fill, self.align.unwrap_or(Align::Left)))
    }

    fn format_integer(&self, number: i64) -> std::result::Result<String, String> {
        let kind = self.kind.unwrap_or('d');
        if kind == 's' {
            return Err("整數值無法使用格式類型 's'".to_string());
        }
        if self.precision.is_some() && !matches!(kind, 'f' | 'F' | '%') {
            return Err("整數格式不允許精度".to_string());
        }

        let magnitude = number.unsigned_abs();
        let (prefix, digits) = match kind {
            'b' => ("0b", format!("{:b}", magnitude)),
            'o' => ("0o", format!("{:o}", magnitude)),
            'x' => ("0x", format!("{:x}", magnitude)),
            'X' => ("0X", format!("{:X}", magnitude)),
            'c' => {
                if self.sign.is_some() || self.alternate || self.grouping.is_some() {
                    return Err("格式類型 'c' 不允許正負號、'#' 或千分位".to_string());
                }
                let c = u32::try_from(number)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| format!("{} 不是有效的字元碼", number))?;
                let fill = self.fill.unwrap_or(if self.zero { '0' } else { ' ' });
                return Ok(pad(
                    &c.to_string(),
                    self.width,
                    fill,
                    self.align.unwrap_or(Align::Right),
                ));
            }
            'f' | 'F' | '%' => {
                let scaled = if kind == '%' {
                    magnitude as f64 * 100.0
                } else {
                    magnitude as f64
                };
                let mut text = format!("{:.*}", self.precision.unwrap_or(6), scaled);
                if kind == '%' {
                    text.push('%');
                }
                ("", text)
            }
            _ => ("", magnitude.to_string()),
        };

        let digits = match self.grouping {
            None => digits,
            Some(separator) => {
                let group = match kind {
                    'd' | 'f' | 'F' | '%' if separator == ',' || separator == '_' => 3,
                    'b' | 'o' | 'x' | 'X' if separator == '_' => 4,
                    _ => return Err(format!("格式類型 '{}' 不允許 '{}'", kind, separator)),
                };
                group_digits(&digits, separator, group)
            }
        };

        let sign = match (number < 0, self.sign) {
            (true, _) => "-",
            (false, Some(Sign::Plus)) => "+",
            (false, Some(Sign::Space)) => " ",
            (false, _) => "",
        };
        let prefix = if self.alternate { prefix } else { "" };

        let (fill, align) = match (self.fill, self.align) {
            (None, None) if self.zero => ('0', Align::AfterSign),
            (fill, align) => (
                fill.unwrap_or(if self.zero { '0' } else { ' ' }),
                align.unwrap_or(Align::Right),
            ),
        };

        let head = format!("{}{}", sign, prefix);
        if align == Align::AfterSign {
            let width = self
                .width
                .map(|width| width.saturating_sub(head.chars().count()));
            Ok(format!("{}{}", head, pad(&digits, width, fill, Align::Right)))
        } else {
            Ok(pad(&format!("{}{}", head, digits), self.width, fill, align))
        }
    }
}

/// 在整數部分插入千分位分隔符
fn group_digits(digits: &str, separator: char, group: usize) -> String {
    let (integer, fraction) = match digits.find(|c: char| !c.is_ascii_alphanumeric()) {
        Some(i) => (&digits[..i], &digits[i..]),
        None => (digits, ""),
    };

    let count = integer.chars().count();
    let mut out = String::with_capacity(digits.len() + count / group);
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (count - i) % group == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out.push_str(fraction);
    out
}

fn pad(text: &str, width: Option<usize>, fill: char, align: Align) -> String {
    let len = text.chars().count();
    let width = match width {
        Some(width) if width > len => width,
        _ => return text.to_string(),
    };
    let gap = width - len;
    let fill_n = |n: usize| std::iter::repeat(fill).take(n).collect::<String>();

    match align {
        Align::Left => format!("{}{}", text, fill_n(gap)),
        Align::Center => format!("{}{}{}", fill_n(gap / 2), text, fill_n(gap - gap / 2)),
        Align::Right | Align::AfterSign => format!("{}{}", fill_n(gap), text),
    }
}
