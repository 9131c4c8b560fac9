/// Two-level (line → station) choice made in the station picker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StationSelection {
    pub linea: String,
    pub estacion: String,
}

impl StationSelection {
    /// Picking a line always clears the station.
    pub fn choose_line(&mut self, linea: &str) {
        self.linea = linea.to_string();
        self.estacion.clear();
    }

    /// Returns the completed pair when both parts are non-empty.
    pub fn choose_station(&mut self, estacion: &str) -> Option<(String, String)> {
        self.estacion = estacion.to_string();
        self.complete()
    }

    pub fn complete(&self) -> Option<(String, String)> {
        if self.linea.is_empty() || self.estacion.is_empty() {
            None
        } else {
            Some((self.linea.clone(), self.estacion.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_alone_emits_nothing() {
        let mut selection = StationSelection::default();
        selection.choose_line("linea 1");
        assert_eq!(selection.complete(), None);
    }

    #[test]
    fn test_station_completes_selection() {
        let mut selection = StationSelection::default();
        selection.choose_line("linea 1");
        assert_eq!(
            selection.choose_station("balderas"),
            Some(("linea 1".to_string(), "balderas".to_string()))
        );
    }

    #[test]
    fn test_changing_line_clears_station() {
        let mut selection = StationSelection::default();
        selection.choose_line("linea 1");
        selection.choose_station("balderas");
        selection.choose_line("linea 2");

        assert_eq!(selection.estacion, "");
        assert_eq!(selection.complete(), None);
        assert_eq!(selection.choose_station(""), None);
    }

    #[test]
    fn test_transfer_station_is_chosen_again_on_new_line() {
        let mut selection = StationSelection::default();
        selection.choose_line("linea 1");
        selection.choose_station("pantitlan");
        selection.choose_line("linea 5");
        assert_eq!(selection.complete(), None);

        assert_eq!(
            selection.choose_station("pantitlan"),
            Some(("linea 5".to_string(), "pantitlan".to_string()))
        );
    }
}
