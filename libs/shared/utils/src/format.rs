//! Brazilian display formats for money, phones and document numbers.

fn digits(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn currency_symbol(code: &str) -> &str {
    match code {
        "BRL" => "R$",
        "USD" => "US$",
        "EUR" => "€",
        other => other,
    }
}

fn group_thousands(value: u64) -> String {
    let raw = value.to_string();
    let mut out = String::with_capacity(raw.len() + raw.len() / 3);
    for (i, c) in raw.chars().enumerate() {
        if i > 0 && (raw.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

/// `1234.5` in BRL becomes `R$ 1.234,50`.
pub fn format_currency(amount: f64, currency: &str) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "{}{} {},{:02}",
        sign,
        currency_symbol(currency),
        group_thousands(cents / 100),
        cents % 100
    )
}

/// `(11) 98765-4321` for mobiles, `(11) 3456-7890` for landlines; anything else
/// is returned unchanged.
pub fn format_phone(phone: &str) -> String {
    let clean = digits(phone);
    match clean.len() {
        11 => format!("({}) {}-{}", &clean[..2], &clean[2..7], &clean[7..]),
        10 => format!("({}) {}-{}", &clean[..2], &clean[2..6], &clean[6..]),
        _ => phone.to_string(),
    }
}

pub fn format_cpf(cpf: &str) -> String {
    let clean = digits(cpf);
    if clean.len() != 11 {
        return clean;
    }
    format!("{}.{}.{}-{}", &clean[..3], &clean[3..6], &clean[6..9], &clean[9..])
}

pub fn format_cnpj(cnpj: &str) -> String {
    let clean = digits(cnpj);
    if clean.len() != 14 {
        return clean;
    }
    format!(
        "{}.{}.{}/{}-{}",
        &clean[..2],
        &clean[2..5],
        &clean[5..8],
        &clean[8..12],
        &clean[12..]
    )
}

pub fn format_cep(cep: &str) -> String {
    let clean = digits(cep);
    if clean.len() != 8 {
        return clean;
    }
    format!("{}-{}", &clean[..5], &clean[5..])
}
