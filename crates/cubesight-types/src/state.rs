//! [`CubeState`] – the 54-facelet surface being reconstructed.
//!
//! Facelets are stored in piece order (U, R, F, D, L, B; nine each).  A new
//! state has its six centers resolved to their own face and every other
//! position unresolved.  Once all positions are written the state can be
//! serialized into the 54-character string the external solver consumes.

use std::fmt;

use crate::{CubeError, FACELET_COUNT, Face, Facelet};

/// The facelet string of a solved cube.
pub const SOLVED_FACELETS: &str = "UUUUUUUUURRRRRRRRRFFFFFFFFFDDDDDDDDDLLLLLLLLLBBBBBBBBB";

/// Partially or fully resolved surface state, indexed by piece order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CubeState {
    cells: [Option<Face>; FACELET_COUNT],
}

impl Default for CubeState {
    fn default() -> Self {
        Self::new()
    }
}

impl CubeState {
    /// A state with only the centers resolved.
    pub fn new() -> Self {
        let mut cells = [None; FACELET_COUNT];
        for center in Facelet::centers() {
            cells[center.piece_index()] = Some(center.face());
        }
        Self { cells }
    }

    /// A fully resolved solved cube.
    pub fn solved() -> Self {
        let mut cells = [None; FACELET_COUNT];
        for f in Facelet::all() {
            cells[f.piece_index()] = Some(f.face());
        }
        Self { cells }
    }

    pub fn get(&self, facelet: Facelet) -> Option<Face> {
        self.cells[facelet.piece_index()]
    }

    /// Overwrite the color at `facelet`, regardless of any previous value.
    pub fn set(&mut self, facelet: Facelet, color: Face) {
        self.cells[facelet.piece_index()] = Some(color);
    }

    /// Raw cells in piece order.
    pub fn cells(&self) -> &[Option<Face>; FACELET_COUNT] {
        &self.cells
    }

    /// Positions that have not been written yet, in piece order.
    pub fn unresolved(&self) -> Vec<Facelet> {
        Facelet::all().filter(|f| self.get(*f).is_none()).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Occurrences of each color, indexed by [`Face::ordinal`].
    pub fn color_counts(&self) -> [usize; 6] {
        let mut counts = [0; 6];
        for face in self.cells.iter().flatten() {
            counts[face.ordinal()] += 1;
        }
        counts
    }

    /// Check that the state is complete and that each color appears on
    /// exactly nine facelets.
    ///
    /// # Errors
    ///
    /// [`CubeError::Incomplete`] if any position is unresolved, otherwise
    /// [`CubeError::ColorImbalance`] for the first color whose count is off.
    pub fn verify(&self) -> Result<(), CubeError> {
        let unresolved = self.cells.iter().filter(|c| c.is_none()).count();
        if unresolved > 0 {
            return Err(CubeError::Incomplete { unresolved });
        }
        let counts = self.color_counts();
        for face in Face::ALL {
            let count = counts[face.ordinal()];
            if count != 9 {
                return Err(CubeError::ColorImbalance { face, count });
            }
        }
        Ok(())
    }

    /// Serialize into the solver's 54-character facelet string.
    ///
    /// # Errors
    ///
    /// See [`verify`][Self::verify]; an unverified state is never serialized.
    pub fn to_facelet_string(&self) -> Result<String, CubeError> {
        self.verify()?;
        Ok(self.cells.iter().flatten().map(|f| f.letter()).collect())
    }

    /// Parse a 54-character facelet string.  Color balance is not checked.
    ///
    /// # Errors
    ///
    /// [`CubeError::InvalidNotation`] on a wrong length or a letter outside
    /// `URFDLB`.
    pub fn from_facelet_string(s: &str) -> Result<Self, CubeError> {
        let letters: Vec<char> = s.chars().collect();
        if letters.len() != FACELET_COUNT {
            return Err(CubeError::InvalidNotation(format!(
                "facelet string has {} characters (expected {FACELET_COUNT})",
                letters.len()
            )));
        }
        let mut cells = [None; FACELET_COUNT];
        for (cell, c) in cells.iter_mut().zip(letters) {
            *cell = Some(Face::from_letter(c)?);
        }
        Ok(Self { cells })
    }
}

impl fmt::Display for CubeState {
    /// Facelet letters in piece order, `.` for unresolved positions.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cell in &self.cells {
            match cell {
                Some(face) => write!(f, "{face}")?,
                None => f.write_str(".")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_has_only_centers() {
        let s = CubeState::new();
        assert_eq!(s.unresolved().len(), 48);
        assert!(!s.is_complete());
        for center in Facelet::centers() {
            assert_eq!(s.get(center), Some(center.face()));
        }
        assert_eq!(s.to_string().chars().filter(|c| *c != '.').count(), 6);
    }

    #[test]
    fn solved_state_serializes_to_solved_string() {
        assert_eq!(
            CubeState::solved().to_facelet_string().unwrap(),
            SOLVED_FACELETS
        );
    }

    #[test]
    fn incomplete_state_refuses_to_serialize() {
        assert_eq!(
            CubeState::new().to_facelet_string(),
            Err(CubeError::Incomplete { unresolved: 48 })
        );
    }

    #[test]
    fn imbalanced_state_refuses_to_serialize() {
        let mut s = CubeState::solved();
        s.set(Facelet::new(Face::U, 1).unwrap(), Face::R);
        assert_eq!(
            s.to_facelet_string(),
            Err(CubeError::ColorImbalance {
                face: Face::U,
                count: 8
            })
        );
    }

    #[test]
    fn set_overwrites() {
        let mut s = CubeState::new();
        let f = Facelet::new(Face::D, 3).unwrap();
        s.set(f, Face::L);
        s.set(f, Face::B);
        assert_eq!(s.get(f), Some(Face::B));
    }

    #[test]
    fn facelet_string_round_trip() {
        let text = "DRLUUBFBRBLURRLRUBLRDDFDLFUFUFFDBRDUBRUFLLFDDBFLUBLRBD";
        let s = CubeState::from_facelet_string(text).unwrap();
        assert_eq!(s.to_facelet_string().unwrap(), text);
    }

    #[test]
    fn from_facelet_string_rejects_bad_input() {
        assert!(CubeState::from_facelet_string("UUU").is_err());
        let bad = SOLVED_FACELETS.replacen('U', "x", 1);
        assert!(CubeState::from_facelet_string(&bad).is_err());
    }
}
