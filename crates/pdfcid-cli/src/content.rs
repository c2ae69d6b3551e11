//! Just enough content stream parsing to find the strings shown by text
//! operators and the font selected for each.

/// A content stream operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Number(f64),
    /// Stored without the leading `/`.
    Name(String),
    /// Literal or hex string, decoded to raw bytes.
    String(Vec<u8>),
    Array(Vec<Operand>),
    /// Booleans, null and dictionaries; never needed for text.
    Other,
}

/// An operator with the operands that preceded it.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    pub name: String,
    pub operands: Vec<Operand>,
}

/// A string painted by `Tj`, `TJ`, `'` or `"` with the font resource name
/// active at that point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShownString {
    pub font: Option<String>,
    pub bytes: Vec<u8>,
}

/// Split content stream bytes into operators.
pub fn tokenize(input: &[u8]) -> Result<Vec<Operator>, String> {
    let mut ops = Vec::new();
    let mut stack: Vec<Operand> = Vec::new();
    let mut pos = 0;

    loop {
        skip_whitespace_and_comments(input, &mut pos);
        let Some(&b) = input.get(pos) else {
            break;
        };
        match b {
            b'a'..=b'z' | b'A'..=b'Z' | b'\'' | b'"' | b'*' => {
                let keyword = parse_keyword(input, &mut pos);
                match keyword.as_str() {
                    "true" | "false" | "null" => stack.push(Operand::Other),
                    "BI" => {
                        skip_inline_image(input, &mut pos);
                        stack.clear();
                    }
                    _ => ops.push(Operator {
                        name: keyword,
                        operands: std::mem::take(&mut stack),
                    }),
                }
            }
            b']' => return Err("unexpected ']' outside array".to_string()),
            _ => stack.push(parse_operand(input, &mut pos)?),
        }
    }

    Ok(ops)
}

/// Collect every shown string in painting order.
pub fn shown_strings(ops: &[Operator]) -> Vec<ShownString> {
    let mut font: Option<String> = None;
    let mut shown = Vec::new();

    for op in ops {
        let bytes = match (op.name.as_str(), op.operands.as_slice()) {
            ("Tf", [Operand::Name(name), ..]) => {
                font = Some(name.clone());
                continue;
            }
            ("Tj" | "'", [.., Operand::String(s)]) => s.clone(),
            ("\"", [_, _, Operand::String(s)]) => s.clone(),
            ("TJ", [Operand::Array(items)]) => items
                .iter()
                .filter_map(|item| match item {
                    Operand::String(s) => Some(s.as_slice()),
                    _ => None,
                })
                .flatten()
                .copied()
                .collect(),
            _ => continue,
        };
        shown.push(ShownString {
            font: font.clone(),
            bytes,
        });
    }

    shown
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | 0x0C | 0x00)
}

fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

fn skip_whitespace_and_comments(input: &[u8], pos: &mut usize) {
    while let Some(&b) = input.get(*pos) {
        if is_whitespace(b) {
            *pos += 1;
        } else if b == b'%' {
            while input.get(*pos).is_some_and(|&c| c != b'\n' && c != b'\r') {
                *pos += 1;
            }
        } else {
            break;
        }
    }
}

fn parse_operand(input: &[u8], pos: &mut usize) -> Result<Operand, String> {
    match input[*pos] {
        b'(' => parse_literal_string(input, pos).map(Operand::String),
        b'<' if input.get(*pos + 1) == Some(&b'<') => {
            skip_dictionary(input, pos)?;
            Ok(Operand::Other)
        }
        b'<' => parse_hex_string(input, pos).map(Operand::String),
        b'[' => {
            *pos += 1;
            parse_array(input, pos).map(Operand::Array)
        }
        b'/' => Ok(Operand::Name(parse_name(input, pos))),
        b'0'..=b'9' | b'+' | b'-' | b'.' => parse_number(input, pos).map(Operand::Number),
        b'a'..=b'z' | b'A'..=b'Z' => {
            // Only `true`, `false` and `null` reach here, inside arrays.
            parse_keyword(input, pos);
            Ok(Operand::Other)
        }
        other => {
            *pos += 1;
            Err(format!("unexpected byte 0x{other:02X} in content stream"))
        }
    }
}

fn parse_literal_string(input: &[u8], pos: &mut usize) -> Result<Vec<u8>, String> {
    *pos += 1;
    let mut out = Vec::new();
    let mut depth = 1u32;

    while let Some(&b) = input.get(*pos) {
        *pos += 1;
        match b {
            b'(' => {
                depth += 1;
                out.push(b);
            }
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(out);
                }
                out.push(b);
            }
            b'\\' => {
                let Some(&escaped) = input.get(*pos) else {
                    break;
                };
                *pos += 1;
                match escaped {
                    b'n' => out.push(b'\n'),
                    b'r' => out.push(b'\r'),
                    b't' => out.push(b'\t'),
                    b'b' => out.push(0x08),
                    b'f' => out.push(0x0C),
                    b'\r' => {
                        if input.get(*pos) == Some(&b'\n') {
                            *pos += 1;
                        }
                    }
                    b'\n' => {}
                    b'0'..=b'7' => {
                        let mut value = u32::from(escaped - b'0');
                        for _ in 0..2 {
                            match input.get(*pos) {
                                Some(&d @ b'0'..=b'7') => {
                                    value = value * 8 + u32::from(d - b'0');
                                    *pos += 1;
                                }
                                _ => break,
                            }
                        }
                        out.push((value & 0xFF) as u8);
                    }
                    other => out.push(other),
                }
            }
            _ => out.push(b),
        }
    }

    Err("unterminated literal string".to_string())
}

fn parse_hex_string(input: &[u8], pos: &mut usize) -> Result<Vec<u8>, String> {
    *pos += 1;
    let mut digits = Vec::new();
    loop {
        let Some(&b) = input.get(*pos) else {
            return Err("unterminated hex string".to_string());
        };
        *pos += 1;
        match b {
            b'>' => break,
            _ if is_whitespace(b) => {}
            _ => digits.push(hex_digit(b)?),
        }
    }
    if digits.len() % 2 != 0 {
        digits.push(0);
    }
    Ok(digits.chunks(2).map(|pair| (pair[0] << 4) | pair[1]).collect())
}

fn hex_digit(b: u8) -> Result<u8, String> {
    match b {
        b'0'..=b'9' => Ok(b - b'0'),
        b'a'..=b'f' => Ok(b - b'a' + 10),
        b'A'..=b'F' => Ok(b - b'A' + 10),
        _ => Err(format!("invalid hex digit: {:?}", b as char)),
    }
}

fn parse_array(input: &[u8], pos: &mut usize) -> Result<Vec<Operand>, String> {
    let mut items = Vec::new();
    loop {
        skip_whitespace_and_comments(input, pos);
        match input.get(*pos) {
            None => return Err("unterminated array".to_string()),
            Some(b']') => {
                *pos += 1;
                return Ok(items);
            }
            Some(_) => items.push(parse_operand(input, pos)?),
        }
    }
}

fn skip_dictionary(input: &[u8], pos: &mut usize) -> Result<(), String> {
    let mut depth = 0u32;
    while *pos < input.len() {
        match (input[*pos], input.get(*pos + 1)) {
            (b'<', Some(b'<')) => {
                depth += 1;
                *pos += 2;
            }
            (b'>', Some(b'>')) => {
                depth -= 1;
                *pos += 2;
                if depth == 0 {
                    return Ok(());
                }
            }
            (b'(', _) => {
                parse_literal_string(input, pos)?;
            }
            _ => *pos += 1,
        }
    }
    Err("unterminated dictionary".to_string())
}

fn parse_name(input: &[u8], pos: &mut usize) -> String {
    *pos += 1;
    let start = *pos;
    while input
        .get(*pos)
        .is_some_and(|&b| !is_whitespace(b) && !is_delimiter(b))
    {
        *pos += 1;
    }

    let raw = &input[start..*pos];
    let mut name = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == b'#' && i + 2 < raw.len() {
            if let (Ok(hi), Ok(lo)) = (hex_digit(raw[i + 1]), hex_digit(raw[i + 2])) {
                name.push((hi << 4) | lo);
                i += 3;
                continue;
            }
        }
        name.push(raw[i]);
        i += 1;
    }
    String::from_utf8_lossy(&name).into_owned()
}

fn parse_number(input: &[u8], pos: &mut usize) -> Result<f64, String> {
    let start = *pos;
    *pos += 1;
    while input
        .get(*pos)
        .is_some_and(|&b| b.is_ascii_digit() || b == b'.')
    {
        *pos += 1;
    }
    let token = String::from_utf8_lossy(&input[start..*pos]);
    token
        .parse()
        .map_err(|_| format!("invalid number: {token}"))
}

fn parse_keyword(input: &[u8], pos: &mut usize) -> String {
    let start = *pos;
    while input
        .get(*pos)
        .is_some_and(|&b| b.is_ascii_alphabetic() || matches!(b, b'*' | b'\'' | b'"' | b'0' | b'1'))
    {
        *pos += 1;
    }
    String::from_utf8_lossy(&input[start..*pos]).into_owned()
}

/// Skip `BI ... ID <data> EI`.
fn skip_inline_image(input: &[u8], pos: &mut usize) {
    while *pos + 2 < input.len() {
        if is_whitespace(input[*pos])
            && &input[*pos + 1..*pos + 3] == b"EI"
            && input.get(*pos + 3).is_none_or(|&b| is_whitespace(b))
        {
            *pos += 3;
            return;
        }
        *pos += 1;
    }
    *pos = input.len();
}
