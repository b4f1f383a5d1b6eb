/// Every ordering of the four lineup slots.
pub const MAX_SEAT_PERMUTATIONS: usize = 24;

/// Deterministic seatings: entry `i` of a permutation is the lineup slot that
/// sits in seat `i`. The identity seating always comes first.
#[derive(Debug, Clone)]
pub struct SeatPermutations {
    permutations: Vec<[usize; 4]>,
}

impl SeatPermutations {
    pub fn new(count: usize) -> Self {
        let limit = count.min(MAX_SEAT_PERMUTATIONS);
        let mut permutations = Vec::with_capacity(limit);
        let mut slots = [0usize, 1, 2, 3];
        // Rotations first so small counts still move every agent round the table.
        for shift in 0..4 {
            if permutations.len() == limit {
                break;
            }
            permutations.push(std::array::from_fn(|seat| (seat + shift) % 4));
        }
        permute(&mut slots, 0, limit, &mut permutations);
        Self { permutations }
    }

    pub fn as_slice(&self) -> &[[usize; 4]] {
        &self.permutations
    }

    pub fn len(&self) -> usize {
        self.permutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permutations.is_empty()
    }
}

fn permute(data: &mut [usize; 4], start: usize, limit: usize, output: &mut Vec<[usize; 4]>) {
    if output.len() >= limit {
        return;
    }
    if start == data.len() - 1 {
        if !output.contains(data) {
            output.push(*data);
        }
        return;
    }
    for idx in start..data.len() {
        data.swap(start, idx);
        permute(data, start + 1, limit, output);
        data.swap(start, idx);
        if output.len() >= limit {
            break;
        }
    }
}
