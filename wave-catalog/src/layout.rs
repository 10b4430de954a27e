use std::collections::HashSet;

use crate::event::CatalogError;

const ROW_PREFIXES: [char; 10] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J'];

/// Lay out `total` seats over rows A..J, `ceil(total / 10)` seats per row.
pub fn generate_rows(total: u32) -> Vec<String> {
    let per_row = total.div_ceil(ROW_PREFIXES.len() as u32).max(1);
    (0..total)
        .map(|i| {
            let prefix = ROW_PREFIXES[(i / per_row) as usize];
            format!("{}{}", prefix, i % per_row + 1)
        })
        .collect()
}

/// Parse a seat map such as `"A1-A10, B1-B5, C7"` into seat numbers.
/// Maps describing more than `max_seats` seats are rejected before expansion.
pub fn parse_seat_map(map: &str, max_seats: u32) -> Result<Vec<String>, CatalogError> {
    let mut seats = Vec::new();
    let mut described: u64 = 0;
    let mut seen = HashSet::new();

    for range in map.split(',').map(str::trim).filter(|r| !r.is_empty()) {
        let (start, end) = match range.split_once('-') {
            Some((start, end)) => (start.trim(), end.trim()),
            None => (range, range),
        };
        let (prefix, first) = split_seat(start)?;
        let (end_prefix, last) = split_seat(end)?;

        if prefix != end_prefix {
            return Err(CatalogError::InvalidSeatMap(format!("range {} spans two rows", range)));
        }
        if last < first {
            return Err(CatalogError::InvalidSeatMap(format!("range {} is reversed", range)));
        }
        described += u64::from(last - first) + 1;
        if described > u64::from(max_seats) {
            return Err(CatalogError::InvalidSeatMap(format!(
                "seat map describes more than {} seats",
                max_seats
            )));
        }

        for n in first..=last {
            let seat = format!("{}{}", prefix, n);
            if !seen.insert(seat.clone()) {
                return Err(CatalogError::InvalidSeatMap(format!("seat {} listed twice", seat)));
            }
            seats.push(seat);
        }
    }

    if seats.is_empty() {
        return Err(CatalogError::InvalidSeatMap("seat map is empty".to_string()));
    }
    Ok(seats)
}

fn split_seat(seat: &str) -> Result<(&str, u32), CatalogError> {
    let digits_at = seat
        .find(|c: char| !c.is_ascii_uppercase())
        .unwrap_or(seat.len());
    let (prefix, number) = seat.split_at(digits_at);
    if prefix.is_empty() {
        return Err(CatalogError::InvalidSeatMap(format!("seat {} has no row letter", seat)));
    }
    let number = number
        .parse::<u32>()
        .map_err(|_| CatalogError::InvalidSeatMap(format!("seat {} has no valid number", seat)))?;
    Ok((prefix, number))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_rows() {
        let seats = generate_rows(150);
        assert_eq!(seats.len(), 150);
        assert_eq!(seats[0], "A1");
        assert_eq!(seats[14], "A15");
        assert_eq!(seats[15], "B1");
        assert_eq!(seats[149], "J15");

        let small = generate_rows(3);
        assert_eq!(small, vec!["A1", "B1", "C1"]);
    }

    #[test]
    fn test_parse_seat_map() {
        let seats = parse_seat_map("A1-A3, B10-B11,C7", 100).unwrap();
        assert_eq!(seats, vec!["A1", "A2", "A3", "B10", "B11", "C7"]);
    }

    #[test]
    fn test_parse_seat_map_rejects_bad_ranges() {
        assert!(parse_seat_map("", 100).is_err());
        assert!(parse_seat_map("A1-B3", 100).is_err());
        assert!(parse_seat_map("A5-A1", 100).is_err());
        assert!(parse_seat_map("12-14", 100).is_err());
        assert!(parse_seat_map("A1-A3, A2", 100).is_err());
    }

    #[test]
    fn test_parse_seat_map_enforces_limit() {
        assert_eq!(parse_seat_map("A1-A5, B1-B5", 10).unwrap().len(), 10);
        assert!(matches!(parse_seat_map("A1-A5, B1-B6", 10), Err(CatalogError::InvalidSeatMap(_))));
        assert!(matches!(
            parse_seat_map("A1-A4294967295", 10_000),
            Err(CatalogError::InvalidSeatMap(_))
        ));
    }
}
