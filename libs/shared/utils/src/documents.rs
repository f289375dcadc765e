//! Checksum validation for Brazilian taxpayer numbers.

fn digits(raw: &str) -> Vec<u32> {
    raw.chars().filter_map(|c| c.to_digit(10)).collect()
}

fn all_same(digits: &[u32]) -> bool {
    digits.windows(2).all(|w| w[0] == w[1])
}

/// Individual taxpayer number (CPF), with or without the `000.000.000-00` mask.
pub fn is_valid_cpf(cpf: &str) -> bool {
    let d = digits(cpf);
    if d.len() != 11 || all_same(&d) {
        return false;
    }

    let check = |len: usize| -> u32 {
        let sum: u32 = d[..len]
            .iter()
            .enumerate()
            .map(|(i, digit)| digit * (len as u32 + 1 - i as u32))
            .sum();
        let remainder = (sum * 10) % 11;
        if remainder == 10 {
            0
        } else {
            remainder
        }
    };

    check(9) == d[9] && check(10) == d[10]
}

/// Company taxpayer number (CNPJ), with or without the `00.000.000/0000-00` mask.
pub fn is_valid_cnpj(cnpj: &str) -> bool {
    const FIRST: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
    const SECOND: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

    let d = digits(cnpj);
    if d.len() != 14 || all_same(&d) {
        return false;
    }

    let check = |weights: &[u32]| -> u32 {
        let sum: u32 = d.iter().zip(weights).map(|(digit, w)| digit * w).sum();
        match sum % 11 {
            r if r < 2 => 0,
            r => 11 - r,
        }
    };

    check(&FIRST) == d[12] && check(&SECOND) == d[13]
}
