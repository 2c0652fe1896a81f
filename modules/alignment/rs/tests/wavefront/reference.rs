use pimwave_alignment_rs::pairwise::Penalties;

const INF: i32 = i32::MAX / 4;

/// Quadratic gap-affine global alignment (Gotoh). Returns the optimal penalty.
pub fn gotoh(pattern: &[u8], text: &[u8], penalties: &Penalties) -> i32 {
    let (rows, cols) = (pattern.len() + 1, text.len() + 1);
    let open = penalties.gap_open + penalties.gap_extend;
    let extend = penalties.gap_extend;

    let mut m = vec![vec![INF; cols]; rows];
    let mut ins = vec![vec![INF; cols]; rows];
    let mut del = vec![vec![INF; cols]; rows];
    m[0][0] = 0;

    for i in 0..rows {
        for j in 0..cols {
            if i == 0 && j == 0 {
                continue;
            }
            if j > 0 {
                ins[i][j] = (m[i][j - 1] + open).min(ins[i][j - 1] + extend);
            }
            if i > 0 {
                del[i][j] = (m[i - 1][j] + open).min(del[i - 1][j] + extend);
            }
            let mut best = ins[i][j].min(del[i][j]);
            if i > 0 && j > 0 {
                let cost = if pattern[i - 1] == text[j - 1] {
                    penalties.matches
                } else {
                    penalties.mismatch
                };
                best = best.min(m[i - 1][j - 1] + cost);
            }
            m[i][j] = best;
        }
    }
    m[rows - 1][cols - 1]
}

#[test]
fn reference_is_sane() {
    let penalties = Penalties::default();
    assert_eq!(gotoh(b"ACGT", b"ACGT", &penalties), 0);
    assert_eq!(gotoh(b"ACGT", b"AGT", &penalties), 5);
    assert_eq!(gotoh(b"AAAA", b"AAAT", &penalties), 3);
    assert_eq!(gotoh(b"", b"AC", &penalties), 6);
    assert_eq!(gotoh(b"AAAA", b"", &penalties), 8);
    assert_eq!(gotoh(b"AAAA", b"TTTT", &penalties), 12);
}
